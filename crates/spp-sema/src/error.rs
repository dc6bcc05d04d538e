//! Semantic analysis errors

use std::fmt;
use spp_ast::Span;
use thiserror::Error;

/// Broad classification of a semantic error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    SymbolResolution,
    Type,
    BorrowMove,
    Structural,
    /// Compiler defect rather than a problem in the user's program
    Internal,
}

impl ErrorCategory {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::SymbolResolution => "E2100",
            ErrorCategory::Type => "E2200",
            ErrorCategory::BorrowMove => "E2300",
            ErrorCategory::Structural => "E2400",
            ErrorCategory::Internal => "E9000",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::SymbolResolution => "Unresolved symbol",
            ErrorCategory::Type => "Type error",
            ErrorCategory::BorrowMove => "Memory error",
            ErrorCategory::Structural => "Invalid declaration",
            ErrorCategory::Internal => "Internal compiler error",
        }
    }
}

/// Semantic error kinds
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticErrorKind {
    // Symbol resolution
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("type '{ty}' has no attribute '{attribute}'")]
    UnknownAttribute { ty: String, attribute: String },
    #[error("unknown loop tag '{0}'")]
    UnknownTag(String),
    #[error("'{0}' is already defined in this scope")]
    DuplicateSymbol(String),
    #[error("cannot superimpose onto '{0}': the class must be declared or imported first")]
    SupTargetNotFound(String),
    #[error("module '{0}' could not be loaded: {1}")]
    ModuleNotFound(String, String),
    #[error("syntax error in module '{module}': {message}")]
    ImportSyntax { module: String, message: String },

    // Types
    #[error("type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },
    #[error("no overload of '{name}' matches the arguments ({args}):\n{candidates}")]
    NoMatchingOverload { name: String, args: String, candidates: String },
    #[error("if-expression branches have different types: '{first}' and '{other}'")]
    BranchTypeMismatch { first: String, other: String },
    #[error("if-expression used as a value needs an else branch")]
    IfMissingElse,
    #[error("cannot destructure non-tuple type '{0}'")]
    NotATuple(String),
    #[error("tuple destructuring expects {expected} elements, pattern has {found}")]
    TupleArity { expected: usize, found: usize },
    #[error("tuple index {index} out of range for '{ty}'")]
    TupleIndexOutOfRange { index: usize, ty: String },
    #[error("generic '{name}' is already bound to '{bound}', cannot rebind to '{found}'")]
    GenericRebind { name: String, bound: String, found: String },
    #[error("'{name}' takes {expected} generic argument(s), {found} given")]
    TooManyGenerics { name: String, expected: usize, found: usize },
    #[error("'{name}' needs explicit generic argument(s): {missing}")]
    MissingGenerics { name: String, missing: String },
    #[error("generic parameter '{0}' cannot be inferred from any parameter type")]
    UninferableGeneric(String),
    #[error("cannot bind a value of type 'Void'")]
    VoidBinding,
    #[error("type '{0}' is not callable")]
    NotCallable(String),
    #[error("type '{0}' cannot be used in 'with': it needs 'enter' and 'leave' methods")]
    NotAContextManager(String),
    #[error("invalid yield: {0}")]
    InvalidYield(String),
    #[error("function '{name}' must end with a return of '{ty}'")]
    MissingReturn { name: String, ty: String },
    #[error("cannot infer the element type of an empty array")]
    EmptyArray,
    #[error("'{name}' takes {expected} argument(s), {found} given")]
    ArgumentCount { name: String, expected: usize, found: usize },
    #[error("cannot infer the type of '{0}': add a type annotation or an initial value")]
    MissingTypeAnnotation(String),

    // Memory
    #[error("use of moved value '{0}'")]
    UseOfMovedValue(String),
    #[error("use of uninitialised value '{0}'")]
    UseOfUninitialised(String),
    #[error("cannot move '{0}' while it is borrowed")]
    MoveWhileBorrowed(String),
    #[error("cannot borrow '{path}' as {kind}: it overlaps '{other}' in the same call")]
    BorrowConflict { path: String, kind: &'static str, other: String },
    #[error("cannot borrow '{0}' mutably: the variable is not mutable")]
    MutBorrowOfImmutable(String),
    #[error("cannot assign to '{0}': the variable is not mutable")]
    AssignToImmutable(String),
    #[error("cannot assign to this expression")]
    InvalidAssignTarget,

    // Structure
    #[error("missing fields: {0}")]
    MissingFields(String),
    #[error("unknown fields: {0}")]
    UnknownFields(String),
    #[error("duplicate fields: {0}")]
    DuplicateFields(String),
    #[error("'{method}' cannot override '{base}': {reason}")]
    InvalidOverride { method: String, base: String, reason: String },
    #[error("unknown decorator '@{0}'")]
    UnknownDecorator(String),
    #[error("invalid use of '@{decorator}': {reason}")]
    InvalidDecorator { decorator: String, reason: String },
    #[error("abstract method '{0}' cannot have a body")]
    AbstractWithBody(String),
    #[error("function '{0}' needs a body")]
    MissingBody(String),
    #[error("'{0}' used outside of a loop")]
    OutsideLoop(&'static str),

    // Compiler defects
    #[error("unsupported construct: {0}")]
    Unsupported(String),
    #[error("scope traversal out of step with the AST: {0}")]
    TraversalMismatch(String),
}

impl SemanticErrorKind {
    pub fn category(&self) -> ErrorCategory {
        use SemanticErrorKind::*;
        match self {
            UnknownIdentifier(_) | UnknownType(_) | UnknownAttribute { .. } | UnknownTag(_)
            | DuplicateSymbol(_) | SupTargetNotFound(_) | ModuleNotFound(..) | ImportSyntax { .. } => {
                ErrorCategory::SymbolResolution
            }
            TypeMismatch { .. } | NoMatchingOverload { .. } | BranchTypeMismatch { .. } | IfMissingElse
            | NotATuple(_) | TupleArity { .. } | TupleIndexOutOfRange { .. } | GenericRebind { .. }
            | TooManyGenerics { .. } | MissingGenerics { .. } | UninferableGeneric(_) | VoidBinding
            | NotCallable(_) | NotAContextManager(_) | InvalidYield(_) | MissingReturn { .. }
            | EmptyArray | ArgumentCount { .. } | MissingTypeAnnotation(_) => ErrorCategory::Type,
            UseOfMovedValue(_) | UseOfUninitialised(_) | MoveWhileBorrowed(_) | BorrowConflict { .. }
            | MutBorrowOfImmutable(_) | AssignToImmutable(_) | InvalidAssignTarget => ErrorCategory::BorrowMove,
            MissingFields(_) | UnknownFields(_) | DuplicateFields(_) | InvalidOverride { .. }
            | UnknownDecorator(_) | InvalidDecorator { .. } | AbstractWithBody(_) | MissingBody(_)
            | OutsideLoop(_) => ErrorCategory::Structural,
            Unsupported(_) | TraversalMismatch(_) => ErrorCategory::Internal,
        }
    }
}

/// Semantic error anchored at a source span
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub span: Span,
    /// "did you mean" and similar hints
    pub help: Option<String>,
    /// Where the conflicting event happened, e.g. the earlier move
    pub note: Option<(String, Span)>,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, span: Span) -> Self {
        Self { kind, span, help: None, note: None }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_note(mut self, message: impl Into<String>, span: Span) -> Self {
        self.note = Some((message.into(), span));
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}:{}: {}", self.category().title(), self.span.start, self.span.end, self.kind)?;
        if let Some(help) = &self.help {
            write!(f, " ({})", help)?;
        }
        Ok(())
    }
}

impl std::error::Error for SemanticError {}

pub type SemaResult<T> = Result<T, SemanticError>;
