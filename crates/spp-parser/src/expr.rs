//! Expression parsing

use super::*;
use crate::parser::starts_uppercase;

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Node<Expr>> {
        let target = self.parse_expression_with_precedence(1)?;

        if let Some(op) = self.assignment_operator() {
            self.advance();
            let value = self.parse_expression()?;
            let span = target.span.merge(&value.span);
            return Ok(Node::new(
                Expr::Assign {
                    op,
                    target: Box::new(target),
                    value: Box::new(value),
                },
                span,
            ));
        }

        Ok(target)
    }

    pub(crate) fn parse_expression_with_precedence(&mut self, min_precedence: u8) -> ParseResult<Node<Expr>> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let precedence = self.get_infix_precedence();
            if precedence == 0 || precedence < min_precedence {
                break;
            }
            let op = match self.binary_operator() {
                Some(op) => op,
                None => break,
            };
            self.advance();

            let right = self.parse_expression_with_precedence(precedence + 1)?;
            let span = left.span.merge(&right.span);
            left = Node::new(
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;
        let op = match self.current_token().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix_expression(),
        };
        self.advance();

        let operand = self.parse_unary_expression()?;
        let span = start.merge(&operand.span);
        Ok(Node::new(
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix_expression(&mut self) -> ParseResult<Node<Expr>> {
        let mut expr = self.parse_primary_expression()?;

        loop {
            match self.current_token().kind {
                TokenKind::Dot => {
                    self.advance();
                    let op = if self.check(&TokenKind::NumberLiteral) {
                        let token = self.advance();
                        let span = token.span;
                        let index = token.value.parse::<usize>().map_err(|_| ParseError {
                            message: format!("Invalid tuple index: {}", token.value),
                            span,
                        })?;
                        PostfixOp::TupleIndex(Node::new(index, span))
                    } else {
                        PostfixOp::Member(self.parse_identifier()?)
                    };
                    expr = self.finish_postfix(expr, op);
                }
                TokenKind::LParen => {
                    let args = self.parse_call_arguments()?;
                    expr = self.finish_postfix(expr, PostfixOp::Call { generics: vec![], args });
                }
                TokenKind::LBracket if is_path(&expr.value) => {
                    let generics = self.parse_generic_args()?;
                    if self.check(&TokenKind::LParen) {
                        let args = self.parse_call_arguments()?;
                        expr = self.finish_postfix(expr, PostfixOp::Call { generics, args });
                    } else if self.check(&TokenKind::LBrace) && !self.no_struct_init {
                        expr = self.parse_struct_init(expr, generics)?;
                    } else {
                        return Err(self.error("Expected '(' or '{' after generic arguments".to_string()));
                    }
                }
                TokenKind::LBrace if !self.no_struct_init && is_type_path(&expr.value) => {
                    expr = self.parse_struct_init(expr, vec![])?;
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn finish_postfix(&self, base: Node<Expr>, op: PostfixOp) -> Node<Expr> {
        let span = base.span.merge(&self.previous_token().span);
        Node::new(
            Expr::Postfix {
                base: Box::new(base),
                op,
            },
            span,
        )
    }

    fn parse_call_arguments(&mut self) -> ParseResult<Vec<Node<Arg>>> {
        self.consume(TokenKind::LParen)?;
        let saved = std::mem::replace(&mut self.no_struct_init, false);

        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let start = self.current_token().span;
            let convention = self.parse_convention();
            let value = self.parse_expression()?;
            let span = start.merge(&value.span);
            args.push(Node::new(Arg { convention, value }, span));
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RParen)?;

        self.no_struct_init = saved;
        Ok(args)
    }

    /// `Type{a: 1, b, else: fallback}`, with the type already parsed as an expression path
    fn parse_struct_init(&mut self, path: Node<Expr>, generics: Vec<Node<Type>>) -> ParseResult<Node<Expr>> {
        let ty = match path_to_type(&path, generics) {
            Some(ty) => ty,
            None => return Err(self.error("Struct initializer needs a type name".to_string())),
        };

        self.consume(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        let mut default = None;
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            if self.check(&TokenKind::Else) {
                self.advance();
                self.consume(TokenKind::Colon)?;
                default = Some(Box::new(self.parse_expression()?));
            } else {
                let name = self.parse_identifier()?;
                let value = if self.check(&TokenKind::Colon) {
                    self.advance();
                    Some(self.parse_expression()?)
                } else {
                    None
                };
                fields.push(FieldInit { name, value });
            }
            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;

        let span = path.span.merge(&self.previous_token().span);
        Ok(Node::new(Expr::StructInit { ty, fields, default }, span))
    }

    fn parse_primary_expression(&mut self) -> ParseResult<Node<Expr>> {
        let start = self.current_token().span;

        let expr = match self.current_token().kind {
            TokenKind::NumberLiteral => {
                let token = self.advance();
                let value = token.value.parse::<f64>().map_err(|_| ParseError {
                    message: format!("Invalid number literal: {}", token.value),
                    span: token.span,
                })?;
                Expr::Literal(Literal::Number(value))
            }
            TokenKind::StringLiteral => Expr::Literal(Literal::String(self.advance().value.clone())),
            TokenKind::RegexLiteral => Expr::Literal(Literal::Regex(self.advance().value.clone())),
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Bool(false))
            }
            TokenKind::Identifier => Expr::Ident(self.parse_identifier()?.value),
            TokenKind::SelfValue => {
                self.advance();
                Expr::SelfValue
            }
            TokenKind::Underscore => {
                self.advance();
                Expr::Placeholder
            }
            TokenKind::LParen => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_struct_init, false);
                let mut items = Vec::new();
                let mut is_tuple = self.check(&TokenKind::RParen);
                while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                    items.push(self.parse_expression()?);
                    if !self.check(&TokenKind::RParen) {
                        self.consume(TokenKind::Comma)?;
                        is_tuple = true;
                    }
                }
                self.consume(TokenKind::RParen)?;
                self.no_struct_init = saved;

                match (is_tuple, items.pop()) {
                    (false, Some(inner)) => return Ok(inner),
                    (_, last) => {
                        items.extend(last);
                        Expr::Literal(Literal::Tuple(items))
                    }
                }
            }
            TokenKind::LBracket => {
                self.advance();
                let saved = std::mem::replace(&mut self.no_struct_init, false);
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
                    items.push(self.parse_expression()?);
                    if !self.check(&TokenKind::RBracket) {
                        self.consume(TokenKind::Comma)?;
                    }
                }
                self.consume(TokenKind::RBracket)?;
                self.no_struct_init = saved;
                Expr::Literal(Literal::Array(items))
            }
            TokenKind::Pipe | TokenKind::PipePipe => Expr::Lambda(self.parse_lambda()?),
            TokenKind::If => Expr::If(Box::new(self.parse_if_expression()?)),
            TokenKind::LBrace => Expr::Block(self.parse_block()?.value),
            _ => {
                return Err(self.error(format!(
                    "Expected expression, found {}",
                    self.current_token().kind
                )))
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(expr, span))
    }

    fn parse_lambda(&mut self) -> ParseResult<LambdaExpr> {
        let params = if self.check(&TokenKind::PipePipe) {
            self.advance();
            Vec::new()
        } else {
            self.consume(TokenKind::Pipe)?;
            let params = self.parse_function_params()?;
            self.consume(TokenKind::Pipe)?;
            params
        };

        if let Some(self_param) = params.iter().find(|p| p.is_self) {
            return Err(ParseError {
                message: "Lambdas cannot take 'self'".to_string(),
                span: self_param.name.span,
            });
        }

        let return_type = if self.check(&TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_expression()?;
        Ok(LambdaExpr {
            params,
            return_type,
            body: Box::new(body),
        })
    }

    pub(crate) fn parse_if_expression(&mut self) -> ParseResult<IfExpr> {
        self.consume(TokenKind::If)?;
        let condition = self.parse_condition()?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.check(&TokenKind::Else) {
            self.advance();
            let start = self.current_token().span;
            let branch = if self.check(&TokenKind::If) {
                Expr::If(Box::new(self.parse_if_expression()?))
            } else {
                Expr::Block(self.parse_block()?.value)
            };
            let span = start.merge(&self.previous_token().span);
            Some(Node::new(branch, span))
        } else {
            None
        };

        Ok(IfExpr {
            condition,
            then_branch,
            else_branch,
        })
    }
}

/// Identifier or member chain: `a`, `a.b.c`
fn is_path(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Postfix { base, op: PostfixOp::Member(_) } => is_path(&base.value),
        _ => false,
    }
}

/// Path whose last segment names a type: `Point`, `geo.Point`
fn is_type_path(expr: &Expr) -> bool {
    let last = match expr {
        Expr::Ident(ident) => &ident.name,
        Expr::Postfix { op: PostfixOp::Member(member), .. } => &member.value.name,
        _ => return false,
    };
    is_path(expr) && starts_uppercase(last)
}

fn path_to_type(expr: &Node<Expr>, generics: Vec<Node<Type>>) -> Option<Node<Type>> {
    fn collect(expr: &Node<Expr>, parts: &mut Vec<Node<GenericIdent>>) -> bool {
        match &expr.value {
            Expr::Ident(ident) => {
                parts.push(Node::new(GenericIdent { name: ident.clone(), generics: vec![] }, expr.span));
                true
            }
            Expr::Postfix { base, op: PostfixOp::Member(member) } => {
                if !collect(base, parts) {
                    return false;
                }
                parts.push(Node::new(
                    GenericIdent { name: member.value.clone(), generics: vec![] },
                    member.span,
                ));
                true
            }
            _ => false,
        }
    }

    let mut parts = Vec::new();
    if !collect(expr, &mut parts) {
        return None;
    }
    if let Some(last) = parts.last_mut() {
        last.value.generics = generics;
    }
    Some(Node::new(Type::Single(parts), expr.span))
}
