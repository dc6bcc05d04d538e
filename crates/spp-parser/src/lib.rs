//! # SPP Parser
//!
//! Recursive descent parser for SPP source.
//! Uses precedence climbing for binary expressions.

use spp_ast::*;
use spp_lexer::{Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod expr;
mod stmt;
mod types;
mod decl;
mod pattern;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Lexes and parses one source file.
pub fn parse_source(source: &str, file_id: usize) -> Result<Program, Vec<ParseError>> {
    let tokens = spp_lexer::tokenize(source, file_id);
    Parser::new(tokens).parse_program()
}

// =============================================================================
// Tests
// =============================================================================
