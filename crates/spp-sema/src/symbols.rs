//! Symbols stored in scope tables, and the memory state of variables

use serde::Serialize;
use spp_ast::{self as ast, Node, Span};

use crate::types::Type;

/// Index of a scope in the scope arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub usize);

/// Index of a type symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub usize);

/// Index of a function symbol; also its declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FunctionId(pub usize);

/// Ownership state of a variable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStatus {
    /// The variable is itself a `&` borrow (a `&` parameter)
    pub is_borrowed_ref: bool,
    /// The variable is itself a `&mut` borrow
    pub is_borrowed_mut: bool,
    pub is_initialized: bool,
    pub is_partially_moved: bool,
    pub moved_at: Option<Span>,
    pub borrowed_at: Option<Span>,
    pub initialized_at: Option<Span>,
}

impl MemoryStatus {
    pub fn initialized(at: Span) -> Self {
        Self {
            is_initialized: true,
            initialized_at: Some(at),
            ..Self::default()
        }
    }

    pub fn borrowed(convention: ast::Convention, at: Span) -> Self {
        let mut status = Self::initialized(at);
        match convention {
            ast::Convention::Ref => status.is_borrowed_ref = true,
            ast::Convention::Mut => status.is_borrowed_mut = true,
            ast::Convention::Move => {}
        }
        if convention != ast::Convention::Move {
            status.borrowed_at = Some(at);
        }
        status
    }
}

/// Type of a variable, resolved lazily for class attributes
#[derive(Debug, Clone)]
pub enum VarType {
    Known(Type),
    /// Declared type and the scope to resolve it in
    Deferred { ty: Node<ast::Type>, scope: ScopeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VariableKind {
    Local,
    Param,
    Attribute,
    /// Overload group handle
    Function,
    EnumVariant,
}

/// Variable symbol
#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub name: String,
    pub ty: VarType,
    pub kind: VariableKind,
    pub is_mutable: bool,
    pub is_comptime: bool,
    pub memory: MemoryStatus,
    pub span: Span,
}

impl VariableSymbol {
    pub fn new(name: impl Into<String>, ty: VarType, kind: VariableKind, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            is_mutable: false,
            is_comptime: matches!(kind, VariableKind::Function | VariableKind::EnumVariant),
            memory: MemoryStatus::initialized(span),
            span,
        }
    }

    pub fn mutable(mut self, is_mutable: bool) -> Self {
        self.is_mutable = is_mutable;
        self
    }

    pub fn with_memory(mut self, memory: MemoryStatus) -> Self {
        self.memory = memory;
        self
    }

    /// Writable through this name: `let mut` or a `&mut` parameter
    pub fn is_mutable_place(&self) -> bool {
        self.is_mutable || self.memory.is_borrowed_mut
    }
}

#[derive(Debug, Clone)]
pub enum TypeSymbolKind {
    Class { generics: Vec<String> },
    Enum,
    Generic { constraints: Vec<Node<ast::Type>> },
    /// Typedef or import alias
    Alias { target: Type },
}

/// Type symbol
#[derive(Debug, Clone)]
pub struct TypeSymbol {
    pub name: String,
    pub kind: TypeSymbolKind,
    /// Member scope of the class (shared by aliases)
    pub scope: Option<ScopeId>,
    /// Types superimposed onto this one with `sup Base for This`
    pub bases: Vec<TypeId>,
    pub span: Span,
}

/// Loop tag symbol
#[derive(Debug, Clone)]
pub struct TagSymbol {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionFlags {
    pub is_virtual: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub decorators_applied: bool,
}

/// One overload candidate with its full signature
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: String,
    pub generics: Vec<Node<ast::GenericParam>>,
    pub params: Vec<ast::Param>,
    pub return_type: Option<Node<ast::Type>>,
    pub decorators: Vec<Node<ast::Decorator>>,
    pub has_body: bool,
    /// Own scope, holding generic placeholders and parameters
    pub scope: ScopeId,
    /// Scope whose overload registry lists this candidate
    pub owner: ScopeId,
    pub flags: FunctionFlags,
    pub span: Span,
}

impl FunctionSymbol {
    pub fn is_method(&self) -> bool {
        self.params.first().map_or(false, |p| p.is_self)
    }

    pub fn generic_names(&self) -> Vec<String> {
        self.generics.iter().map(|g| g.value.name.name.clone()).collect()
    }

    /// Parameters a caller supplies: `self` is implicit on bound calls
    pub fn call_params(&self, bound: bool) -> &[ast::Param] {
        if bound && self.is_method() {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Human-readable signature for overload diagnostics
    pub fn signature(&self) -> String {
        let generics = if self.generics.is_empty() {
            String::new()
        } else {
            let names = self.generic_names();
            format!("[{}]", names.join(", "))
        };
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.ty {
                Some(ty) => format!("{}: {}{}", p.name.value, p.convention, ty.value),
                None => format!("{}self", p.convention),
            })
            .collect();
        let ret = match &self.return_type {
            Some(ty) => format!(" -> {}", ty.value),
            None => String::new(),
        };
        format!("fn {}{}({}){}", self.name, generics, params.join(", "), ret)
    }
}
