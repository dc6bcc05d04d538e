//! Overload resolution

use spp_ast::{self as ast, Convention, Node, Span};

use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::scope::{ScopeHandler, ScopeKind};
use crate::symbols::{FunctionId, FunctionSymbol, TypeId};
use crate::types::{FunctionRef, Type};
use crate::unify::{self, Bindings};

/// One argument at a call site, after inference
#[derive(Debug, Clone)]
pub struct CallArg {
    pub convention: Convention,
    pub ty: Type,
    pub span: Span,
}

impl CallArg {
    pub fn new(convention: Convention, ty: Type, span: Span) -> Self {
        Self { convention, ty, span }
    }
}

/// The selected candidate of a call
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    /// `None` for closure calls
    pub function: Option<FunctionId>,
    pub ret: Type,
    pub bindings: Bindings,
}

/// A candidate that accepted the arguments
struct Match {
    function: FunctionId,
    generic_count: usize,
    distance: i32,
    ret: Type,
    bindings: Bindings,
}

impl ScopeHandler {
    /// Picks the overload of `callee` that accepts `args`.
    ///
    /// When several candidates match, the one with the fewest generic
    /// parameters wins, then the one closest to the receiver's class scope
    /// along sup edges, then the earliest declared.
    pub fn resolve_call(
        &self,
        callee: &Type,
        explicit: &[Type],
        args: &[CallArg],
        span: Span,
    ) -> SemaResult<ResolvedCall> {
        match callee {
            Type::Function(function) => self.resolve_overload(function, explicit, args, span),
            Type::Closure { params, ret } => self.resolve_closure(params, ret, args, span),
            other => Err(SemanticError::new(SemanticErrorKind::NotCallable(other.to_string()), span)),
        }
    }

    fn resolve_closure(
        &self,
        params: &[(Convention, Type)],
        ret: &Type,
        args: &[CallArg],
        span: Span,
    ) -> SemaResult<ResolvedCall> {
        if params.len() != args.len() {
            return Err(SemanticError::new(
                SemanticErrorKind::ArgumentCount { name: "closure".into(), expected: params.len(), found: args.len() },
                span,
            ));
        }
        let mut bindings = Bindings::new();
        for ((convention, param), arg) in params.iter().zip(args) {
            check_convention(*convention, param, arg).map_err(|kind| SemanticError::new(kind, arg.span))?;
            unify::types_equal_account_for_generic(self, &[], param, &arg.ty, &mut bindings)
                .map_err(|kind| SemanticError::new(kind, arg.span))?;
        }
        Ok(ResolvedCall { function: None, ret: ret.clone(), bindings })
    }

    fn resolve_overload(
        &self,
        function: &FunctionRef,
        explicit: &[Type],
        args: &[CallArg],
        span: Span,
    ) -> SemaResult<ResolvedCall> {
        let candidates = self.collect_overloads(function.scope, &function.name);
        let mut matches = Vec::new();
        let mut failures = Vec::new();

        for candidate in &candidates {
            match self.try_candidate(*candidate, function, explicit, args) {
                Ok(found) => matches.push(found),
                Err(kind) => failures.push((*candidate, kind)),
            }
        }

        if matches.is_empty() {
            // A lone candidate reports its own failure.
            if let [(_, kind)] = failures.as_slice() {
                return Err(SemanticError::new(kind.clone(), span));
            }
            let listed: Vec<String> = failures
                .iter()
                .map(|(id, kind)| format!("  {}: {}", self.function(*id).signature(), kind))
                .collect();
            return Err(SemanticError::new(
                SemanticErrorKind::NoMatchingOverload {
                    name: function.name.clone(),
                    args: describe_args(args),
                    candidates: listed.join("\n"),
                },
                span,
            ));
        }

        matches.sort_by_key(|m| (m.generic_count, m.distance, m.function));
        if matches.len() > 1 {
            tracing::debug!(
                name = %function.name,
                candidates = matches.len(),
                chosen = ?matches[0].function,
                "ambiguous overload, applying tie-break"
            );
        }
        let chosen = matches.swap_remove(0);
        Ok(ResolvedCall { function: Some(chosen.function), ret: chosen.ret, bindings: chosen.bindings })
    }

    fn try_candidate(
        &self,
        id: FunctionId,
        via: &FunctionRef,
        explicit: &[Type],
        args: &[CallArg],
    ) -> Result<Match, SemanticErrorKind> {
        let func = self.function(id);
        let own = self.generic_ids(func);
        let inherited = self.sup_generic_ids(func);
        let mut generics = own.clone();
        generics.extend(inherited.iter().copied());

        let mut bindings = Bindings::new();

        if let (Some(receiver), ScopeKind::Sup(info)) = (&via.receiver, &self.scope(func.owner).kind) {
            if let Ok(target) = self.resolve_type_lenient(&info.target_ast, func.owner) {
                // Failure only means the receiver reached this block through a base.
                let _ = unify::types_equal_account_for_generic(self, &inherited, &target, receiver, &mut bindings);
            }
        }

        if explicit.len() > own.len() {
            return Err(SemanticErrorKind::TooManyGenerics {
                name: func.name.clone(),
                expected: own.len(),
                found: explicit.len(),
            });
        }
        for (param, arg) in own.iter().zip(explicit) {
            bindings.insert(*param, arg.clone());
        }

        let params = func.call_params(via.bound);
        if params.len() != args.len() {
            return Err(SemanticErrorKind::ArgumentCount {
                name: func.name.clone(),
                expected: params.len(),
                found: args.len(),
            });
        }

        for (param, arg) in params.iter().zip(args) {
            let param_ty = self.param_type(func, param).map_err(|e| e.kind)?;
            unify::types_equal_account_for_generic(self, &generics, &param_ty, &arg.ty, &mut bindings)?;
            check_convention(param.convention, &unify::substitute(&param_ty, &bindings), arg)?;
        }

        self.check_constraints(func, &own, &bindings)?;

        let unbound: Vec<String> = func
            .generic_names()
            .into_iter()
            .zip(&own)
            .filter(|(_, id)| !bindings.contains_key(id))
            .map(|(name, _)| name)
            .collect();
        if !unbound.is_empty() {
            return Err(SemanticErrorKind::MissingGenerics { name: func.name.clone(), missing: unbound.join(", ") });
        }

        let ret = match &func.return_type {
            Some(ty) => self.resolve_type(ty, func.scope).map_err(|e| e.kind)?,
            None => self.void(func.span).map_err(|e| e.kind)?,
        };
        let distance = match self.level_of_sup_scope(via.scope, func.owner) {
            -1 => i32::MAX,
            level => level,
        };

        Ok(Match {
            function: id,
            generic_count: own.len(),
            distance,
            ret: unify::substitute(&ret, &bindings),
            bindings,
        })
    }

    /// Placeholder ids of a function's own generics.
    pub fn generic_ids(&self, func: &FunctionSymbol) -> Vec<TypeId> {
        func.generic_names()
            .iter()
            .filter_map(|name| self.scope(func.scope).types.get(name).copied())
            .collect()
    }

    /// Placeholder ids of the generics of the sup block owning `func`.
    pub fn sup_generic_ids(&self, func: &FunctionSymbol) -> Vec<TypeId> {
        match &self.scope(func.owner).kind {
            ScopeKind::Sup(info) => info
                .generics
                .iter()
                .filter_map(|name| self.scope(func.owner).types.get(name).copied())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Declared type of a parameter; `self` is the enclosing `Self`.
    pub fn param_type(&self, func: &FunctionSymbol, param: &ast::Param) -> SemaResult<Type> {
        match &param.ty {
            Some(ty) => self.resolve_type(ty, func.scope),
            None => self.resolve_type_lenient(&Node::new(ast::Type::simple("Self", param.name.span), param.name.span), func.scope),
        }
    }

    fn check_constraints(&self, func: &FunctionSymbol, own: &[TypeId], bindings: &Bindings) -> Result<(), SemanticErrorKind> {
        for (generic, id) in func.generics.iter().zip(own) {
            let bound = match bindings.get(id) {
                Some(bound) => bound,
                None => continue,
            };
            for constraint in &generic.value.constraints {
                let required = self.resolve_type_lenient(constraint, func.scope).map_err(|e| e.kind)?;
                let satisfied = match (bound.id(), required.id()) {
                    (Some(b), Some(r)) => b == r || self.is_subtype(b, r),
                    _ => bound == &required,
                };
                if !satisfied {
                    return Err(SemanticErrorKind::TypeMismatch {
                        expected: format!("{} satisfying {}", generic.value.name, required),
                        found: bound.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_convention(expected: Convention, param: &Type, arg: &CallArg) -> Result<(), SemanticErrorKind> {
    if expected == arg.convention {
        Ok(())
    } else {
        Err(SemanticErrorKind::TypeMismatch {
            expected: format!("{}{}", expected, param),
            found: format!("{}{}", arg.convention, arg.ty),
        })
    }
}

fn describe_args(args: &[CallArg]) -> String {
    args.iter()
        .map(|a| format!("{}{}", a.convention, a.ty))
        .collect::<Vec<_>>()
        .join(", ")
}
