//! Helper methods and utilities

use super::*;

impl Parser {
    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Node<Ident>> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Node::new(Ident::new(token.value.clone()), token.span))
    }

    /// `@meta.virtual_method`, any number of them
    pub(crate) fn parse_decorators(&mut self) -> ParseResult<Vec<Node<Decorator>>> {
        let mut decorators = Vec::new();
        while self.check(&TokenKind::At) {
            let start = self.advance().span;
            let mut path = vec![self.parse_identifier()?.value];
            while self.check(&TokenKind::Dot) {
                self.advance();
                path.push(self.parse_identifier()?.value);
            }
            let span = start.merge(&self.previous_token().span);
            decorators.push(Node::new(Decorator { path }, span));
        }
        Ok(decorators)
    }

    /// `&` or `&mut`, absent means move
    pub(crate) fn parse_convention(&mut self) -> Convention {
        if self.check(&TokenKind::Amp) {
            self.advance();
            if self.check(&TokenKind::Mut) {
                self.advance();
                Convention::Mut
            } else {
                Convention::Ref
            }
        } else {
            Convention::Move
        }
    }

    pub(crate) fn parse_function_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.check(&TokenKind::Pipe) && !self.is_at_end() {
            params.push(self.parse_function_param()?);
            if !self.check(&TokenKind::RParen) && !self.check(&TokenKind::Pipe) {
                self.consume(TokenKind::Comma)?;
            }
        }

        Ok(params)
    }

    /// `mut name: &Type` or `&mut self`
    pub(crate) fn parse_function_param(&mut self) -> ParseResult<Param> {
        let leading = self.parse_convention();

        if self.check(&TokenKind::SelfValue) {
            let token = self.advance();
            return Ok(Param {
                name: Node::new(Ident::new("self"), token.span),
                convention: leading,
                ty: None,
                is_mutable: false,
                is_self: true,
            });
        }

        if leading != Convention::Move {
            return Err(self.error("Conventions on parameters are written on the type".to_string()));
        }

        let is_mutable = if self.check(&TokenKind::Mut) {
            self.advance();
            true
        } else {
            false
        };

        let name = self.parse_identifier()?;
        self.consume(TokenKind::Colon)?;
        let convention = self.parse_convention();
        let ty = self.parse_type()?;

        Ok(Param {
            name,
            convention,
            ty: Some(ty),
            is_mutable,
            is_self: false,
        })
    }

    // =========================================================================
    // Operator Precedence
    // =========================================================================

    pub(crate) fn get_infix_precedence(&self) -> u8 {
        match self.current_token().kind {
            TokenKind::PipePipe => 1,
            TokenKind::AmpAmp => 2,
            TokenKind::EqEq | TokenKind::BangEq => 3,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => 4,
            TokenKind::Plus | TokenKind::Minus => 5,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 6,
            _ => 0,
        }
    }

    pub(crate) fn binary_operator(&self) -> Option<BinaryOp> {
        let op = match self.current_token().kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            TokenKind::AmpAmp => BinaryOp::And,
            TokenKind::PipePipe => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub(crate) fn assignment_operator(&self) -> Option<AssignOp> {
        let op = match self.current_token().kind {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            _ => return None,
        };
        Some(op)
    }

    // =========================================================================
    // Utility Methods (Token Manipulation)
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {}, found {}", kind, self.current_token().kind)))
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            span: self.current_token().span,
        }
    }

    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if matches!(self.previous_token().kind, TokenKind::Semicolon | TokenKind::RBrace) {
                return;
            }

            match self.current_token().kind {
                TokenKind::Cls
                | TokenKind::Fn
                | TokenKind::Sup
                | TokenKind::Enum
                | TokenKind::Use
                | TokenKind::Let
                | TokenKind::While
                | TokenKind::Ret
                | TokenKind::At => return,
                _ => {}
            }

            self.advance();
        }
    }
}
