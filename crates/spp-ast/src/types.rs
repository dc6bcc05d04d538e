//! Type definitions for the AST

use super::*;
use std::fmt;

/// Type expression
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Possibly qualified type path: `std.Arr[Num]`
    Single(Vec<Node<GenericIdent>>),

    /// Tuple type: (T1, T2, ...)
    Tuple(Vec<Node<Type>>),
}

/// One segment of a type path with its generic arguments
#[derive(Debug, Clone, PartialEq)]
pub struct GenericIdent {
    pub name: Ident,
    pub generics: Vec<Node<Type>>,
}

impl GenericIdent {
    pub fn plain(name: impl Into<String>) -> Self {
        Self { name: Ident::new(name), generics: vec![] }
    }
}

impl Type {
    /// Single-segment, non-generic type such as `Num`.
    pub fn simple(name: impl Into<String>, span: Span) -> Self {
        Type::Single(vec![Node::new(GenericIdent::plain(name), span)])
    }

    /// Name of the final path segment, if this is a single type.
    pub fn last_name(&self) -> Option<&str> {
        match self {
            Type::Single(parts) => parts.last().map(|p| p.value.name.name.as_str()),
            Type::Tuple(_) => None,
        }
    }

    /// Generic arguments of the final path segment.
    pub fn last_generics(&self) -> &[Node<Type>] {
        match self {
            Type::Single(parts) => parts.last().map(|p| p.value.generics.as_slice()).unwrap_or(&[]),
            Type::Tuple(_) => &[],
        }
    }
}

impl fmt::Display for GenericIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.generics.is_empty() {
            write!(f, "[")?;
            for (i, g) in self.generics.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", g.value)?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Single(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", part.value)?;
                }
                Ok(())
            }
            Type::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item.value)?;
                }
                write!(f, ")")
            }
        }
    }
}
