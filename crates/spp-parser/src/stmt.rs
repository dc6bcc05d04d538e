//! Statement parsing

use super::*;

impl Parser {
    pub(crate) fn parse_block(&mut self) -> ParseResult<Node<Block>> {
        let start = self.consume(TokenKind::LBrace)?.span;
        let saved = std::mem::replace(&mut self.no_struct_init, false);

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_statement()?);
        }
        self.consume(TokenKind::RBrace)?;

        self.no_struct_init = saved;
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Block { stmts }, span))
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Node<Stmt>> {
        let start = self.current_token().span;

        let stmt = match self.current_token().kind {
            TokenKind::Let => self.parse_let_statement()?,
            TokenKind::Ret => {
                self.advance();
                let value = self.parse_optional_value()?;
                self.consume(TokenKind::Semicolon)?;
                Stmt::Return(value)
            }
            TokenKind::Gen => {
                self.advance();
                let value = self.parse_optional_value()?;
                self.consume(TokenKind::Semicolon)?;
                Stmt::Yield(value)
            }
            TokenKind::Use => Stmt::Typedef(self.parse_typedef()?),
            TokenKind::While => {
                self.advance();
                let condition = self.parse_condition()?;
                let tag = self.parse_optional_alias()?;
                let body = self.parse_block()?;
                Stmt::While { condition, tag, body }
            }
            TokenKind::With => {
                self.advance();
                let value = self.parse_condition()?;
                let alias = self.parse_optional_alias()?;
                let body = self.parse_block()?;
                Stmt::With { value, alias, body }
            }
            TokenKind::LBrace => Stmt::Block(self.parse_block()?.value),
            TokenKind::Exit | TokenKind::Skip => {
                let is_exit = self.check(&TokenKind::Exit);
                self.advance();
                let tag = if self.check(&TokenKind::Identifier) {
                    Some(self.parse_identifier()?)
                } else {
                    None
                };
                self.consume(TokenKind::Semicolon)?;
                if is_exit {
                    Stmt::Exit(tag)
                } else {
                    Stmt::Skip(tag)
                }
            }
            _ => {
                let expr = self.parse_expression()?;
                let block_like = matches!(expr.value, Expr::If(_) | Expr::Block(_));
                if self.check(&TokenKind::Semicolon) {
                    self.advance();
                } else if !block_like && !self.check(&TokenKind::RBrace) {
                    return Err(self.error(format!(
                        "Expected ';' after expression, found {}",
                        self.current_token().kind
                    )));
                }
                Stmt::Expr(expr)
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(stmt, span))
    }

    fn parse_let_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::Let)?;
        let pattern = self.parse_pattern()?;

        let ty = if self.check(&TokenKind::Colon) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let (value, fallback) = if self.check(&TokenKind::Eq) {
            self.advance();
            let value = self.parse_expression()?;
            let fallback = if self.check(&TokenKind::Else) {
                self.advance();
                Some(self.parse_expression()?)
            } else {
                None
            };
            (Some(value), fallback)
        } else {
            (None, None)
        };

        self.consume(TokenKind::Semicolon)?;

        Ok(Stmt::Let(LetStmt {
            pattern,
            ty,
            value,
            fallback,
        }))
    }

    fn parse_optional_value(&mut self) -> ParseResult<Option<Node<Expr>>> {
        if self.check(&TokenKind::Semicolon) || self.check(&TokenKind::RBrace) {
            Ok(None)
        } else {
            Ok(Some(self.parse_expression()?))
        }
    }

    fn parse_optional_alias(&mut self) -> ParseResult<Option<Node<Ident>>> {
        if self.check(&TokenKind::As) {
            self.advance();
            Ok(Some(self.parse_identifier()?))
        } else {
            Ok(None)
        }
    }

    /// Expression where `Name {` must not start a struct initializer
    pub(crate) fn parse_condition(&mut self) -> ParseResult<Node<Expr>> {
        let saved = std::mem::replace(&mut self.no_struct_init, true);
        let result = self.parse_expression();
        self.no_struct_init = saved;
        result
    }
}
