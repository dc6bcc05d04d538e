//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal values
    Literal(Literal),

    /// Identifier reference
    Ident(Ident),

    /// `self`
    SelfValue,

    /// Binary operation: a + b, a == b, etc.
    Binary {
        op: BinaryOp,
        left: Box<Node<Expr>>,
        right: Box<Node<Expr>>,
    },

    /// Unary operation: -a, !a
    Unary {
        op: UnaryOp,
        operand: Box<Node<Expr>>,
    },

    /// Member access, tuple index or call applied to a base expression
    Postfix {
        base: Box<Node<Expr>>,
        op: PostfixOp,
    },

    /// Struct initializer: Point{x: 1, y: 2, else: fallback}
    StructInit {
        ty: Node<Type>,
        fields: Vec<FieldInit>,
        default: Option<Box<Node<Expr>>>,
    },

    /// Assignment: a = b, a += b
    Assign {
        op: AssignOp,
        target: Box<Node<Expr>>,
        value: Box<Node<Expr>>,
    },

    /// Lambda: |x: Num| x + 1
    Lambda(LambdaExpr),

    /// if / else, usable as a value
    If(Box<IfExpr>),

    /// Braced block used as a value
    Block(Block),

    /// `_`
    Placeholder,
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Regex(String),
    Tuple(Vec<Node<Expr>>),
    Array(Vec<Node<Expr>>),
}

/// Operation applied by a postfix expression
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    /// .name
    Member(Node<Ident>),
    /// .0
    TupleIndex(Node<usize>),
    /// [T](args)
    Call {
        generics: Vec<Node<Type>>,
        args: Vec<Node<Arg>>,
    },
}

/// Call argument with its calling convention
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub convention: Convention,
    pub value: Node<Expr>,
}

/// Field in a struct initializer; `value` is `None` for the `Point{x}` shorthand
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInit {
    pub name: Node<Ident>,
    pub value: Option<Node<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<Param>,
    pub return_type: Option<Node<Type>>,
    pub body: Box<Node<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: Node<Expr>,
    pub then_branch: Node<Block>,
    /// Either another `Expr::If` or an `Expr::Block`
    pub else_branch: Option<Node<Expr>>,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Method a binary operator lowers to: `a + b` is `a.add(b)`.
    pub fn method_name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Rem => "rem",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn method_name(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl AssignOp {
    /// Operator a compound assignment expands to.
    pub fn binary(&self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinaryOp::Add),
            AssignOp::SubAssign => Some(BinaryOp::Sub),
            AssignOp::MulAssign => Some(BinaryOp::Mul),
            AssignOp::DivAssign => Some(BinaryOp::Div),
        }
    }
}
