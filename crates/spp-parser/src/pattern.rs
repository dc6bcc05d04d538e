//! Let-binding pattern parsing

use super::*;

impl Parser {
    /// `mut x` or `(a, mut b)`
    pub(crate) fn parse_pattern(&mut self) -> ParseResult<Node<Pattern>> {
        let start = self.current_token().span;

        if self.check(&TokenKind::LParen) {
            self.advance();
            let mut bindings = Vec::new();
            while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                let binding_start = self.current_token().span;
                let binding = self.parse_binding()?;
                let span = binding_start.merge(&self.previous_token().span);
                bindings.push(Node::new(binding, span));
                if !self.check(&TokenKind::RParen) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            self.consume(TokenKind::RParen)?;
            if bindings.is_empty() {
                return Err(self.error("Tuple pattern needs at least one binding".to_string()));
            }
            let span = start.merge(&self.previous_token().span);
            return Ok(Node::new(Pattern::Tuple(bindings), span));
        }

        let binding = self.parse_binding()?;
        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(Pattern::Single(binding), span))
    }

    fn parse_binding(&mut self) -> ParseResult<Binding> {
        let is_mutable = if self.check(&TokenKind::Mut) {
            self.advance();
            true
        } else {
            false
        };
        let name = self.parse_identifier()?;
        Ok(Binding { name: name.value, is_mutable })
    }
}
