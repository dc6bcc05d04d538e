//! Statement definitions for the AST

use super::*;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// let x: T = value else fallback;
    Let(LetStmt),

    /// ret value;
    Return(Option<Node<Expr>>),

    /// gen value;
    Yield(Option<Node<Expr>>),

    /// use Old as New;
    Typedef(TypedefDecl),

    /// while cond as tag { ... }
    While {
        condition: Node<Expr>,
        tag: Option<Node<Ident>>,
        body: Node<Block>,
    },

    /// with value as alias { ... }
    With {
        value: Node<Expr>,
        alias: Option<Node<Ident>>,
        body: Node<Block>,
    },

    /// Inner scope: { ... }
    Block(Block),

    /// exit tag;
    Exit(Option<Node<Ident>>),

    /// skip tag;
    Skip(Option<Node<Ident>>),

    /// Expression statement
    Expr(Node<Expr>),
}

/// Block statement: { stmts }
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
    pub pattern: Node<Pattern>,
    pub ty: Option<Node<Type>>,
    pub value: Option<Node<Expr>>,
    pub fallback: Option<Node<Expr>>,
}

/// Left-hand side of a let statement
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// let mut x
    Single(Binding),
    /// let (a, mut b)
    Tuple(Vec<Node<Binding>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Ident,
    pub is_mutable: bool,
}
