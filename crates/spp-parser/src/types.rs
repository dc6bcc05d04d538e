//! Type parsing

use super::*;

impl Parser {
    /// `a.b.Type[Arg]` or `(T1, T2)`
    pub(crate) fn parse_type(&mut self) -> ParseResult<Node<Type>> {
        let start = self.current_token().span;

        if self.check(&TokenKind::LParen) {
            self.advance();
            let mut items = Vec::new();
            while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                items.push(self.parse_type()?);
                if !self.check(&TokenKind::RParen) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            self.consume(TokenKind::RParen)?;
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(Type::Tuple(items), span));
        }

        let mut parts = vec![self.parse_generic_ident()?];
        while self.check(&TokenKind::Dot) && self.peek_kind(1) == Some(&TokenKind::Identifier) {
            self.advance();
            parts.push(self.parse_generic_ident()?);
        }

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Type::Single(parts), span))
    }

    pub(crate) fn parse_generic_ident(&mut self) -> ParseResult<Node<GenericIdent>> {
        let name = self.parse_identifier()?;
        let generics = if self.check(&TokenKind::LBracket) {
            self.parse_generic_args()?
        } else {
            Vec::new()
        };
        let span = name.span.merge(&self.previous_token().span);
        Ok(Node::new(GenericIdent { name: name.value, generics }, span))
    }

    /// `[T1, T2]` at a use site
    pub(crate) fn parse_generic_args(&mut self) -> ParseResult<Vec<Node<Type>>> {
        self.consume(TokenKind::LBracket)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            args.push(self.parse_type()?);
            if !self.check(&TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBracket)?;
        Ok(args)
    }

    /// `[T, U: Show & Eq]` at a declaration
    pub(crate) fn parse_generic_params(&mut self) -> ParseResult<Vec<Node<GenericParam>>> {
        if !self.check(&TokenKind::LBracket) {
            return Ok(Vec::new());
        }
        self.advance();

        let mut params = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            let name = self.parse_identifier()?;
            let mut constraints = Vec::new();
            if self.check(&TokenKind::Colon) {
                self.advance();
                constraints.push(self.parse_type()?);
                while self.check(&TokenKind::Amp) {
                    self.advance();
                    constraints.push(self.parse_type()?);
                }
            }
            let span = name.span.merge(&self.previous_token().span);
            params.push(Node::new(GenericParam { name: name.value, constraints }, span));
            if !self.check(&TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBracket)?;
        Ok(params)
    }
}
