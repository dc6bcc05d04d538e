//! Declaration parsing

use super::*;

impl Parser {
    /// `fn name[T](params) -> Ret { body }` or `...;` for abstract methods
    pub(crate) fn parse_function(&mut self, decorators: Vec<Node<Decorator>>) -> ParseResult<FunctionDecl> {
        self.consume(TokenKind::Fn)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generic_params()?;

        self.consume(TokenKind::LParen)?;
        let params = self.parse_function_params()?;
        self.consume(TokenKind::RParen)?;

        if let Some(misplaced) = params.iter().skip(1).find(|p| p.is_self) {
            return Err(ParseError {
                message: "'self' must be the first parameter".to_string(),
                span: misplaced.name.span,
            });
        }

        let return_type = if self.check(&TokenKind::Arrow) {
            self.advance();
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.check(&TokenKind::Semicolon) {
            self.advance();
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(FunctionDecl {
            name,
            generics,
            params,
            return_type,
            body,
            decorators,
        })
    }

    /// `cls Name[T] { attr: Type; ... }`
    pub(crate) fn parse_class(&mut self, decorators: Vec<Node<Decorator>>) -> ParseResult<ClassDecl> {
        self.consume(TokenKind::Cls)?;
        let name = self.parse_identifier()?;
        let generics = self.parse_generic_params()?;

        self.consume(TokenKind::LBrace)?;
        let mut attributes = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let start = self.current_token().span;
            let attr_decorators = self.parse_decorators()?;
            let attr_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            self.consume(TokenKind::Semicolon)?;
            let span = start.merge(&self.previous_token().span);
            attributes.push(Node::new(
                ClassAttribute {
                    name: attr_name,
                    ty,
                    decorators: attr_decorators,
                },
                span,
            ));
        }
        self.consume(TokenKind::RBrace)?;

        Ok(ClassDecl {
            name,
            generics,
            attributes,
            decorators,
        })
    }

    /// `enum Name { A, B, C }`
    pub(crate) fn parse_enum(&mut self, decorators: Vec<Node<Decorator>>) -> ParseResult<EnumDecl> {
        self.consume(TokenKind::Enum)?;
        let name = self.parse_identifier()?;

        self.consume(TokenKind::LBrace)?;
        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            variants.push(self.parse_identifier()?);
            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(EnumDecl { name, variants, decorators })
    }

    /// `sup[T] Target[T] { ... }` or `sup Base for Target { ... }`
    pub(crate) fn parse_sup(&mut self, decorators: Vec<Node<Decorator>>) -> ParseResult<SupDecl> {
        self.consume(TokenKind::Sup)?;
        let generics = self.parse_generic_params()?;
        let first = self.parse_type()?;

        let (target, base) = if self.check(&TokenKind::For) {
            self.advance();
            (self.parse_type()?, Some(first))
        } else {
            (first, None)
        };

        self.consume(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let start = self.current_token().span;
            let member_decorators = self.parse_decorators()?;
            let member = match self.current_token().kind {
                TokenKind::Fn => SupMember::Function(self.parse_function(member_decorators)?),
                TokenKind::Use => SupMember::Typedef(self.parse_typedef()?),
                _ => {
                    return Err(self.error(format!(
                        "Expected 'fn' or 'use' in sup block, found {}",
                        self.current_token().kind
                    )))
                }
            };
            let span = start.merge(&self.previous_token().span);
            members.push(Node::new(member, span));
        }
        self.consume(TokenKind::RBrace)?;

        Ok(SupDecl {
            generics,
            target,
            base,
            members,
            decorators,
        })
    }

    /// `use Old as New;`
    pub(crate) fn parse_typedef(&mut self) -> ParseResult<TypedefDecl> {
        self.consume(TokenKind::Use)?;
        let old = self.parse_type()?;
        self.consume(TokenKind::As)?;
        let new = self.parse_identifier()?;
        self.consume(TokenKind::Semicolon)?;
        Ok(TypedefDecl { old, new })
    }
}
