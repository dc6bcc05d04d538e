//! Declaration definitions for the AST

use super::*;
use std::fmt;

/// Function declaration (free function or method in a sup block)
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Node<Ident>,
    pub generics: Vec<Node<GenericParam>>,
    pub params: Vec<Param>,
    pub return_type: Option<Node<Type>>,
    pub body: Option<Node<Block>>,
    pub decorators: Vec<Node<Decorator>>,
}

impl FunctionDecl {
    pub fn has_self(&self) -> bool {
        self.params.first().map_or(false, |p| p.is_self)
    }
}

/// Function or lambda parameter. `self` parameters carry no type.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Node<Ident>,
    pub convention: Convention,
    pub ty: Option<Node<Type>>,
    pub is_mutable: bool,
    pub is_self: bool,
}

/// Generic parameter with optional constraints: T: Copy & Show
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParam {
    pub name: Ident,
    pub constraints: Vec<Node<Type>>,
}

/// Decorator: @meta.virtual_method
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub path: Vec<Ident>,
}

impl Decorator {
    pub fn is_meta(&self) -> bool {
        self.path.len() > 1 && self.path[0].name == "meta"
    }
}

impl fmt::Display for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.path.iter().map(|p| p.name.as_str()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Class declaration: attributes only, behaviour lives in sup blocks
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Node<Ident>,
    pub generics: Vec<Node<GenericParam>>,
    pub attributes: Vec<Node<ClassAttribute>>,
    pub decorators: Vec<Node<Decorator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassAttribute {
    pub name: Node<Ident>,
    pub ty: Node<Type>,
    pub decorators: Vec<Node<Decorator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Node<Ident>,
    pub variants: Vec<Node<Ident>>,
    pub decorators: Vec<Node<Decorator>>,
}

/// Super-imposition: `sup[T] Target[T] { ... }` or `sup Base for Target { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SupDecl {
    pub generics: Vec<Node<GenericParam>>,
    pub target: Node<Type>,
    pub base: Option<Node<Type>>,
    pub members: Vec<Node<SupMember>>,
    pub decorators: Vec<Node<Decorator>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SupMember {
    Function(FunctionDecl),
    Typedef(TypedefDecl),
}

/// Type alias: use Old as New;
#[derive(Debug, Clone, PartialEq)]
pub struct TypedefDecl {
    pub old: Node<Type>,
    pub new: Node<Ident>,
}
