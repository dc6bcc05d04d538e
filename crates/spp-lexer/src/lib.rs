//! # SPP Lexer
//!
//! Turns SPP source text into a flat token stream. Lexical errors are
//! reported in-band as `TokenKind::Error` tokens whose value is the message.

pub mod token;
pub mod lexer;

// Re-export all public types from modules
pub use token::{Token, TokenKind};
pub use lexer::Lexer;

/// Tokenizes `source`, tagging every span with `file_id`.
pub fn tokenize(source: &str, file_id: usize) -> Vec<Token> {
    Lexer::with_file_id(source, file_id).tokenize()
}
