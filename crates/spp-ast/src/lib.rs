//! # SPP AST
//!
//! Abstract Syntax Tree definitions for the SPP compiler front end.
//! Every node is wrapped in [`Node`] so that semantic errors can point back
//! at the exact source range that produced them.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Calling Conventions
// =============================================================================

/// How a value is handed to a parameter: moved, shared-borrowed or
/// exclusively borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Convention {
    /// Moved (default)
    #[default]
    Move,
    /// Shared reference (&)
    Ref,
    /// Exclusive reference (&mut)
    Mut,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Move => Ok(()),
            Convention::Ref => write!(f, "&"),
            Convention::Mut => write!(f, "&mut "),
        }
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod module;

// =============================================================================
// Re-exports
// =============================================================================

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use module::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    fn single(name: &str) -> Type {
        Type::simple(name, dummy_span())
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 9, 2);
        let b = Span::new(1, 6, 2);
        assert_eq!(a.merge(&b), Span::new(1, 9, 2));
    }

    #[test]
    fn test_convention_display() {
        assert_eq!(format!("{}", Convention::Ref), "&");
        assert_eq!(format!("{}", Convention::Mut), "&mut ");
        assert_eq!(format!("{}", Convention::Move), "");
    }

    #[test]
    fn test_type_display() {
        let arr = Type::Single(vec![Node::new(
            GenericIdent {
                name: Ident::new("Arr"),
                generics: vec![Node::new(single("Num"), dummy_span())],
            },
            dummy_span(),
        )]);
        assert_eq!(format!("{}", arr), "Arr[Num]");

        let tuple = Type::Tuple(vec![
            Node::new(single("Num"), dummy_span()),
            Node::new(single("Str"), dummy_span()),
        ]);
        assert_eq!(format!("{}", tuple), "(Num, Str)");
    }

    #[test]
    fn test_qualified_type_parts() {
        let ty = Type::Single(vec![
            Node::new(GenericIdent::plain("std"), dummy_span()),
            Node::new(GenericIdent::plain("Num"), dummy_span()),
        ]);
        assert_eq!(format!("{}", ty), "std.Num");
        assert_eq!(ty.last_name(), Some("Num"));
    }

    #[test]
    fn test_binary_op_method_names() {
        assert_eq!(BinaryOp::Add.method_name(), "add");
        assert_eq!(BinaryOp::Le.method_name(), "le");
        assert_eq!(UnaryOp::Not.method_name(), "not");
        assert_eq!(format!("{}", BinaryOp::Or), "||");
    }

    #[test]
    fn test_function_decl_shape() {
        let func = FunctionDecl {
            name: Node::new(Ident::new("foo"), dummy_span()),
            generics: vec![],
            params: vec![Param {
                name: Node::new(Ident::new("self"), dummy_span()),
                convention: Convention::Ref,
                ty: None,
                is_mutable: false,
                is_self: true,
            }],
            return_type: None,
            body: None,
            decorators: vec![],
        };

        assert_eq!(func.name.value.name, "foo");
        assert!(func.has_self());
        assert!(func.body.is_none());
    }
}
