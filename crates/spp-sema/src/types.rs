//! Resolved type representation

use std::fmt;
use spp_ast::Convention;

use crate::symbols::{ScopeId, TypeId};

/// A type after name resolution.
///
/// Names are resolved to type-symbol ids, so aliases of the same class
/// compare equal. `name` is kept for diagnostics only.
#[derive(Debug, Clone)]
pub enum Type {
    /// Class, enum or generic placeholder
    Named {
        id: TypeId,
        name: String,
        generics: Vec<Type>,
    },
    Tuple(Vec<Type>),
    /// Reference to an overload group
    Function(FunctionRef),
    /// Lambda value
    Closure {
        params: Vec<(Convention, Type)>,
        ret: Box<Type>,
    },
}

/// Where the candidates of a called name live
#[derive(Debug, Clone)]
pub struct FunctionRef {
    pub name: String,
    /// Scope whose overload registry (and sup scopes) hold the candidates
    pub scope: ScopeId,
    /// Type the function was accessed through, for methods
    pub receiver: Option<Box<Type>>,
    /// Accessed on an instance, so `self` is implicit
    pub bound: bool,
}

impl Type {
    pub fn named(id: TypeId, name: impl Into<String>) -> Self {
        Type::Named { id, name: name.into(), generics: vec![] }
    }

    pub fn id(&self) -> Option<TypeId> {
        match self {
            Type::Named { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn generics(&self) -> &[Type] {
        match self {
            Type::Named { generics, .. } => generics,
            _ => &[],
        }
    }

    pub fn is_named(&self, id: TypeId) -> bool {
        self.id() == Some(id)
    }
}

/// Structural equality on resolved ids; names are ignored.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Type::Named { id: a, generics: ga, .. },
                Type::Named { id: b, generics: gb, .. },
            ) => a == b && ga == gb,
            (Type::Tuple(a), Type::Tuple(b)) => a == b,
            (Type::Function(a), Type::Function(b)) => a.name == b.name && a.scope == b.scope,
            (
                Type::Closure { params: pa, ret: ra },
                Type::Closure { params: pb, ret: rb },
            ) => pa == pb && ra == rb,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named { name, generics, .. } => {
                write!(f, "{}", name)?;
                if !generics.is_empty() {
                    write!(f, "[{}]", join(generics))?;
                }
                Ok(())
            }
            Type::Tuple(items) => write!(f, "({})", join(items)),
            Type::Function(func) => write!(f, "fn {}", func.name),
            Type::Closure { params, ret } => {
                let params: Vec<String> = params.iter().map(|(c, t)| format!("{}{}", c, t)).collect();
                write!(f, "|{}| -> {}", params.join(", "), ret)
            }
        }
    }
}

pub(crate) fn join(types: &[Type]) -> String {
    types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_display_name() {
        let a = Type::named(TypeId(3), "Num");
        let b = Type::named(TypeId(3), "Number");
        assert_eq!(a, b);
        assert_ne!(a, Type::named(TypeId(4), "Num"));
    }

    #[test]
    fn test_display() {
        let arr = Type::Named {
            id: TypeId(1),
            name: "Arr".into(),
            generics: vec![Type::named(TypeId(2), "Num")],
        };
        assert_eq!(arr.to_string(), "Arr[Num]");
        let tuple = Type::Tuple(vec![arr, Type::named(TypeId(5), "Str")]);
        assert_eq!(tuple.to_string(), "(Arr[Num], Str)");
    }
}
