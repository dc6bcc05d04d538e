//! Resolution of AST types to semantic types

use spp_ast::{self as ast, Node, Span};

use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::scope::{ScopeHandler, ScopeKind};
use crate::symbols::{ScopeId, TypeId, TypeSymbol, TypeSymbolKind, VarType, VariableSymbol};
use crate::types::Type;
use crate::unify::{self, Bindings};

/// Namespace the prelude is generated into
pub const STD: &str = "std";

/// Prelude types whose values are copied rather than moved
const COPY_TYPES: &[&str] = &["Void", "Bool", "Num", "Str", "Rgx"];

impl ScopeHandler {
    // =========================================================================
    // Type paths
    // =========================================================================

    /// Scope to resolve the last segment of a type path in, and whether the
    /// lookup there is exclusive (no climbing to parents).
    pub fn where_to_look(&self, scope: ScopeId, path: &[Node<ast::GenericIdent>]) -> SemaResult<(ScopeId, bool)> {
        if path.len() <= 1 {
            return Ok((scope, false));
        }
        let modules: Vec<&str> = path[..path.len() - 1]
            .iter()
            .map(|p| p.value.name.name.as_str())
            .collect();
        match self.get_child_scope(self.global(), &modules) {
            Some(found) if matches!(self.scope(found).kind, ScopeKind::Module(_)) => Ok((found, true)),
            _ => {
                let span = path[0].span.merge(&path[path.len() - 2].span);
                Err(SemanticError::new(SemanticErrorKind::UnknownType(modules.join(".")), span))
            }
        }
    }

    /// Id named by a type path, before aliases are followed.
    pub fn lookup_type_id(&self, scope: ScopeId, path: &[Node<ast::GenericIdent>], span: Span) -> SemaResult<TypeId> {
        let last = match path.last() {
            Some(last) => last,
            None => return Err(SemanticError::new(SemanticErrorKind::UnknownType(String::new()), span)),
        };
        let name = &last.value.name.name;
        let (look_in, exclusive) = self.where_to_look(scope, path)?;
        if exclusive {
            self.get_type_exclusive(look_in, name).ok_or_else(|| {
                let full: Vec<&str> = path.iter().map(|p| p.value.name.name.as_str()).collect();
                SemanticError::new(SemanticErrorKind::UnknownType(full.join(".")), last.span)
            })
        } else {
            self.resolve_type_name(look_in, name, last.span)
        }
    }

    /// Class id behind a name, following aliases.
    pub fn underlying_id(&self, id: TypeId) -> TypeId {
        match &self.type_symbol(id).kind {
            TypeSymbolKind::Alias { target } => target.id().unwrap_or(id),
            _ => id,
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolves a type; every class generic must be given.
    pub fn resolve_type(&self, ty: &Node<ast::Type>, scope: ScopeId) -> SemaResult<Type> {
        self.resolve_type_with(ty, scope, true)
    }

    /// Resolves a type, leaving missing class generics for inference.
    pub fn resolve_type_lenient(&self, ty: &Node<ast::Type>, scope: ScopeId) -> SemaResult<Type> {
        self.resolve_type_with(ty, scope, false)
    }

    fn resolve_type_with(&self, ty: &Node<ast::Type>, scope: ScopeId, strict: bool) -> SemaResult<Type> {
        match &ty.value {
            ast::Type::Tuple(items) => items
                .iter()
                .map(|item| self.resolve_type_with(item, scope, strict))
                .collect::<SemaResult<Vec<_>>>()
                .map(Type::Tuple),
            ast::Type::Single(path) => {
                let id = self.lookup_type_id(scope, path, ty.span)?;
                let given = ty.value.last_generics();
                let generics = given
                    .iter()
                    .map(|g| self.resolve_type_with(g, scope, strict))
                    .collect::<SemaResult<Vec<_>>>()?;
                self.instantiate(id, generics, strict, ty.span)
            }
        }
    }

    /// Applies generic arguments to the type symbol `id`.
    pub fn instantiate(&self, id: TypeId, generics: Vec<Type>, strict: bool, span: Span) -> SemaResult<Type> {
        let symbol = self.type_symbol(id);
        match &symbol.kind {
            TypeSymbolKind::Alias { target } => {
                if generics.is_empty() {
                    return Ok(target.clone());
                }
                match target {
                    Type::Named { id: inner, generics: bound, .. } if bound.is_empty() => {
                        self.instantiate(*inner, generics, strict, span)
                    }
                    _ => Err(SemanticError::new(
                        SemanticErrorKind::TooManyGenerics {
                            name: symbol.name.clone(),
                            expected: 0,
                            found: generics.len(),
                        },
                        span,
                    )),
                }
            }
            TypeSymbolKind::Class { generics: params } => {
                if generics.len() > params.len() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::TooManyGenerics {
                            name: symbol.name.clone(),
                            expected: params.len(),
                            found: generics.len(),
                        },
                        span,
                    ));
                }
                if strict && generics.len() < params.len() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::MissingGenerics {
                            name: symbol.name.clone(),
                            missing: params[generics.len()..].join(", "),
                        },
                        span,
                    ));
                }
                Ok(Type::Named { id, name: symbol.name.clone(), generics })
            }
            TypeSymbolKind::Enum | TypeSymbolKind::Generic { .. } => {
                if !generics.is_empty() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::TooManyGenerics {
                            name: symbol.name.clone(),
                            expected: 0,
                            found: generics.len(),
                        },
                        span,
                    ));
                }
                Ok(Type::named(id, symbol.name.clone()))
            }
        }
    }

    /// Declares `use Old as New;` in `scope`. The alias shares the target's
    /// member scope, so aliases of aliases reach the same class.
    pub fn add_typedef(&mut self, scope: ScopeId, decl: &ast::TypedefDecl) -> SemaResult<TypeId> {
        let target = self.resolve_type_lenient(&decl.old, scope)?;
        let member_scope = self.class_scope_of(&target);
        self.add_type(
            scope,
            TypeSymbol {
                name: decl.new.value.name.clone(),
                kind: TypeSymbolKind::Alias { target },
                scope: member_scope,
                bases: Vec::new(),
                span: decl.new.span,
            },
        )
    }

    // =========================================================================
    // Prelude types
    // =========================================================================

    pub fn std_scope(&self) -> Option<ScopeId> {
        self.get_child_scope(self.global(), &[STD])
    }

    /// A prelude type such as `Num`, resolved through `std` rather than
    /// whatever the name means at the use site.
    pub fn std_type(&self, name: &str, span: Span) -> SemaResult<Type> {
        self.std_type_id(name)
            .map(|id| Type::named(id, name))
            .ok_or_else(|| {
                SemanticError::new(SemanticErrorKind::UnknownType(format!("{}.{}", STD, name)), span)
            })
    }

    pub fn std_type_id(&self, name: &str) -> Option<TypeId> {
        self.std_scope().and_then(|std| self.get_type_exclusive(std, name))
    }

    pub fn std_generic(&self, name: &str, argument: Type, span: Span) -> SemaResult<Type> {
        let id = self
            .std_type_id(name)
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::UnknownType(format!("{}.{}", STD, name)), span))?;
        Ok(Type::Named { id, name: name.to_string(), generics: vec![argument] })
    }

    pub fn void(&self, span: Span) -> SemaResult<Type> {
        self.std_type("Void", span)
    }

    pub fn is_void(&self, ty: &Type) -> bool {
        ty.id().is_some() && ty.id() == self.std_type_id("Void")
    }

    /// Values of these types are copied by a move.
    pub fn is_copy(&self, ty: &Type) -> bool {
        match ty.id() {
            Some(id) => COPY_TYPES.iter().any(|name| self.std_type_id(name) == Some(id)),
            None => false,
        }
    }

    /// Element type of `Gen[T]`.
    pub fn generator_item(&self, ty: &Type) -> Option<Type> {
        let gen = self.std_type_id("Gen")?;
        if ty.is_named(gen) {
            ty.generics().first().cloned()
        } else {
            None
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    /// Member scope of a class, enum or alias type.
    pub fn class_scope_of(&self, ty: &Type) -> Option<ScopeId> {
        ty.id().and_then(|id| self.type_symbol(id).scope)
    }

    /// Placeholder ids of a class's own generics, in declaration order.
    pub fn class_generic_ids(&self, id: TypeId) -> Vec<TypeId> {
        let symbol = self.type_symbol(id);
        match (&symbol.kind, symbol.scope) {
            (TypeSymbolKind::Class { generics }, Some(scope)) => generics
                .iter()
                .filter_map(|g| self.scope(scope).types.get(g).copied())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Bindings of a class's generics taken from an instantiated type.
    pub fn receiver_bindings(&self, receiver: &Type) -> Bindings {
        let mut bindings = Bindings::new();
        if let Some(id) = receiver.id() {
            for (param, arg) in self.class_generic_ids(id).into_iter().zip(receiver.generics()) {
                bindings.insert(param, arg.clone());
            }
        }
        bindings
    }

    /// Declared type of a variable; attribute types resolve on demand.
    pub fn variable_type(&self, var: &VariableSymbol) -> SemaResult<Type> {
        match &var.ty {
            VarType::Known(ty) => Ok(ty.clone()),
            VarType::Deferred { ty, scope } => self.resolve_type(ty, *scope),
        }
    }

    /// Type of an attribute read through `receiver`.
    pub fn attribute_type(&self, receiver: &Type, var: &VariableSymbol) -> SemaResult<Type> {
        let declared = self.variable_type(var)?;
        Ok(unify::substitute(&declared, &self.receiver_bindings(receiver)))
    }

    /// `found` may stand where `expected` is required.
    pub fn is_assignable(&self, expected: &Type, found: &Type) -> bool {
        if expected == found {
            return true;
        }
        match (expected, found) {
            (Type::Named { id: e, generics: ge, .. }, Type::Named { id: f, .. }) if ge.is_empty() => {
                self.is_subtype(*f, *e)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::default()
    }

    fn path(parts: &[&str]) -> Node<ast::Type> {
        Node::new(
            ast::Type::Single(parts.iter().map(|p| Node::new(ast::GenericIdent::plain(*p), span())).collect()),
            span(),
        )
    }

    fn declare(scopes: &mut ScopeHandler, scope: ScopeId, name: &str, kind: TypeSymbolKind) -> TypeId {
        scopes
            .add_type(scope, TypeSymbol { name: name.into(), kind, scope: None, bases: vec![], span: span() })
            .unwrap()
    }

    #[test]
    fn test_dotted_path_resolves_exclusively_in_module() {
        let mut scopes = ScopeHandler::new();
        let global = scopes.global();
        let geo = scopes.into_new_scope("geo", ScopeKind::Module("geo".into()));
        let circle = declare(&mut scopes, geo, "Circle", TypeSymbolKind::Enum);
        scopes.exit_cur_scope();
        declare(&mut scopes, global, "Square", TypeSymbolKind::Enum);

        let ty = scopes.resolve_type(&path(&["geo", "Circle"]), global).unwrap();
        assert_eq!(ty.id(), Some(circle));

        let err = scopes.resolve_type(&path(&["geo", "Square"]), global).unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::UnknownType(ref n) if n == "geo.Square"));
        assert!(scopes.resolve_type(&path(&["Circle"]), global).is_err());
    }

    #[test]
    fn test_missing_generics_strict_and_lenient() {
        let mut scopes = ScopeHandler::new();
        let global = scopes.global();
        declare(&mut scopes, global, "Box", TypeSymbolKind::Class { generics: vec!["T".into()] });

        let err = scopes.resolve_type(&path(&["Box"]), global).unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::MissingGenerics { .. }));
        let lenient = scopes.resolve_type_lenient(&path(&["Box"]), global).unwrap();
        assert!(lenient.generics().is_empty());
    }

    #[test]
    fn test_alias_resolves_to_target() {
        let mut scopes = ScopeHandler::new();
        let global = scopes.global();
        let point = declare(&mut scopes, global, "Point", TypeSymbolKind::Class { generics: vec![] });
        let target = Type::named(point, "Point");
        declare(&mut scopes, global, "P", TypeSymbolKind::Alias { target: target.clone() });

        let resolved = scopes.resolve_type(&path(&["P"]), global).unwrap();
        assert_eq!(resolved, target);
        assert_eq!(resolved.to_string(), "Point");
    }
}
