//! Core Parser struct and main parsing methods

use super::*;

/// Recursive descent parser for SPP source
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
    /// Set while parsing `if`/`while`/`with` conditions, where `Name {` opens a block
    pub(crate) no_struct_init: bool,
}

/// What a module-level `use` turned out to be
pub(crate) enum UseItem {
    Import(ImportDecl),
    Typedef(TypedefDecl),
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0, no_struct_init: false }
    }

    /// Parses a complete program
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let mut program = Program::default();
        let mut errors = Vec::new();

        if let Some(lexical) = self.first_lexical_error() {
            return Err(vec![lexical]);
        }

        if self.check(&TokenKind::Mod) {
            match self.parse_module_name() {
                Ok(name) => program.module_name = Some(name),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        while !self.is_at_end() {
            let start = self.current_token().span;
            let result = if self.check(&TokenKind::Use) {
                self.parse_use_item().map(|item| {
                    let span = start.merge(&self.previous_token().span);
                    match item {
                        UseItem::Import(import) => program.imports.push(Node::new(import, span)),
                        UseItem::Typedef(typedef) => {
                            program.members.push(Node::new(ModuleMember::Typedef(typedef), span))
                        }
                    }
                })
            } else {
                self.parse_module_member().map(|member| program.members.push(member))
            };

            if let Err(err) = result {
                errors.push(err);
                self.synchronize();
            }
        }

        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    fn first_lexical_error(&self) -> Option<ParseError> {
        self.tokens
            .iter()
            .find(|t| t.kind == TokenKind::Error)
            .map(|t| ParseError { message: t.value.clone(), span: t.span })
    }

    // =========================================================================
    // Module Items
    // =========================================================================

    fn parse_module_name(&mut self) -> ParseResult<Node<Vec<Ident>>> {
        let start = self.consume(TokenKind::Mod)?.span;
        let mut segments = vec![self.parse_identifier()?.value];
        while self.check(&TokenKind::Dot) {
            self.advance();
            segments.push(self.parse_identifier()?.value);
        }
        self.consume(TokenKind::Semicolon)?;
        Ok(Node::new(segments, start.merge(&self.previous_token().span)))
    }

    pub(crate) fn parse_module_member(&mut self) -> ParseResult<Node<ModuleMember>> {
        let start = self.current_token().span;
        let decorators = self.parse_decorators()?;

        let member = match self.current_token().kind {
            TokenKind::Fn => ModuleMember::Function(self.parse_function(decorators)?),
            TokenKind::Cls => ModuleMember::Class(self.parse_class(decorators)?),
            TokenKind::Sup => ModuleMember::Sup(self.parse_sup(decorators)?),
            TokenKind::Enum => ModuleMember::Enum(self.parse_enum(decorators)?),
            _ => {
                return Err(self.error(format!(
                    "Expected 'fn', 'cls', 'sup', 'enum' or 'use', found {}",
                    self.current_token().kind
                )))
            }
        };

        let span = start.merge(&self.previous_token().span);
        Ok(Node::new(member, span))
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// `use a.b.C;`, `use a.b.{C, D};` or `use Old as New;`
    pub(crate) fn parse_use_item(&mut self) -> ParseResult<UseItem> {
        self.consume(TokenKind::Use)?;

        let mut segments = vec![self.parse_generic_ident()?];
        let mut names = Vec::new();
        let mut braced = false;

        while self.check(&TokenKind::Dot) {
            self.advance();
            if self.check(&TokenKind::LBrace) {
                self.advance();
                while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                    names.push(self.parse_identifier()?);
                    if !self.check(&TokenKind::RBrace) {
                        self.consume(TokenKind::Comma)?;
                    }
                }
                self.consume(TokenKind::RBrace)?;
                braced = true;
                break;
            }
            segments.push(self.parse_generic_ident()?);
        }

        if self.check(&TokenKind::As) {
            if braced {
                return Err(self.error("Cannot alias a braced import list".to_string()));
            }
            self.advance();
            let new = self.parse_identifier()?;
            self.consume(TokenKind::Semicolon)?;
            let start = segments[0].span;
            let end = segments[segments.len() - 1].span;
            let old = Node::new(Type::Single(segments), start.merge(&end));
            return Ok(UseItem::Typedef(TypedefDecl { old, new }));
        }

        self.consume(TokenKind::Semicolon)?;

        if let Some(generic) = segments.iter().find(|s| !s.value.generics.is_empty()) {
            return Err(ParseError {
                message: "Import paths cannot carry generic arguments".to_string(),
                span: generic.span,
            });
        }

        let mut path: Vec<Node<Ident>> = segments
            .into_iter()
            .map(|s| Node::new(s.value.name, s.span))
            .collect();

        if !braced && path.len() > 1 && starts_uppercase(&path[path.len() - 1].value.name) {
            if let Some(last) = path.pop() {
                names.push(last);
            }
        }

        Ok(UseItem::Import(ImportDecl { path, names }))
    }
}

pub(crate) fn starts_uppercase(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_uppercase())
}
