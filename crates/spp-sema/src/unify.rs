//! Structural matching of parameter types against argument types

use std::collections::BTreeMap;

use crate::error::SemanticErrorKind;
use crate::scope::ScopeHandler;
use crate::symbols::TypeId;
use crate::types::Type;

/// Generic placeholder id to its bound type
pub type Bindings = BTreeMap<TypeId, Type>;

/// Matches `param` against `arg`, binding the placeholders listed in
/// `generics`. A placeholder binds on its first occurrence; later
/// occurrences must agree with that binding.
///
/// Generic arguments are compared positionally before the outer types.
/// A non-generic parameter accepts an equal type or one that reaches it
/// through superimposed bases.
pub fn types_equal_account_for_generic(
    scopes: &ScopeHandler,
    generics: &[TypeId],
    param: &Type,
    arg: &Type,
    bindings: &mut Bindings,
) -> Result<(), SemanticErrorKind> {
    match (param, arg) {
        (Type::Named { id, name, .. }, _) if generics.contains(id) => match bindings.get(id) {
            Some(bound) => {
                if bound == arg || scopes.is_assignable(bound, arg) {
                    Ok(())
                } else {
                    Err(SemanticErrorKind::GenericRebind {
                        name: name.clone(),
                        bound: bound.to_string(),
                        found: arg.to_string(),
                    })
                }
            }
            None => {
                bindings.insert(*id, arg.clone());
                Ok(())
            }
        },
        (
            Type::Named { id: p, generics: pg, .. },
            Type::Named { id: a, generics: ag, .. },
        ) => {
            if p == a && pg.len() == ag.len() {
                for (pi, ai) in pg.iter().zip(ag) {
                    types_equal_account_for_generic(scopes, generics, pi, ai, bindings)
                        .map_err(|e| widen(e, param, arg))?;
                }
                Ok(())
            } else if p != a && pg.is_empty() && scopes.is_subtype(*a, *p) {
                Ok(())
            } else {
                Err(mismatch(param, arg))
            }
        }
        (Type::Tuple(ps), Type::Tuple(as_)) if ps.len() == as_.len() => {
            for (pi, ai) in ps.iter().zip(as_) {
                types_equal_account_for_generic(scopes, generics, pi, ai, bindings)
                    .map_err(|e| widen(e, param, arg))?;
            }
            Ok(())
        }
        (
            Type::Closure { params: pp, ret: pr },
            Type::Closure { params: ap, ret: ar },
        ) if pp.len() == ap.len() => {
            for ((pc, pt), (ac, at)) in pp.iter().zip(ap) {
                if pc != ac {
                    return Err(mismatch(param, arg));
                }
                types_equal_account_for_generic(scopes, generics, pt, at, bindings)
                    .map_err(|e| widen(e, param, arg))?;
            }
            types_equal_account_for_generic(scopes, generics, pr, ar, bindings).map_err(|e| widen(e, param, arg))
        }
        _ if param == arg => Ok(()),
        _ => Err(mismatch(param, arg)),
    }
}

fn mismatch(param: &Type, arg: &Type) -> SemanticErrorKind {
    SemanticErrorKind::TypeMismatch { expected: param.to_string(), found: arg.to_string() }
}

/// Reports nested mismatches against the outermost types; rebinds stay as they are.
fn widen(error: SemanticErrorKind, param: &Type, arg: &Type) -> SemanticErrorKind {
    match error {
        SemanticErrorKind::TypeMismatch { .. } => mismatch(param, arg),
        other => other,
    }
}

/// Replaces bound placeholders in `ty`.
pub fn substitute(ty: &Type, bindings: &Bindings) -> Type {
    match ty {
        Type::Named { id, name, generics } => {
            if generics.is_empty() {
                if let Some(bound) = bindings.get(id) {
                    return bound.clone();
                }
            }
            Type::Named {
                id: *id,
                name: name.clone(),
                generics: generics.iter().map(|g| substitute(g, bindings)).collect(),
            }
        }
        Type::Tuple(items) => Type::Tuple(items.iter().map(|t| substitute(t, bindings)).collect()),
        Type::Closure { params, ret } => Type::Closure {
            params: params.iter().map(|(c, t)| (*c, substitute(t, bindings))).collect(),
            ret: Box::new(substitute(ret, bindings)),
        },
        Type::Function(_) => ty.clone(),
    }
}

/// `ty` mentions one of `generics`.
pub fn mentions_any(ty: &Type, generics: &[TypeId]) -> bool {
    match ty {
        Type::Named { id, generics: args, .. } => {
            generics.contains(id) || args.iter().any(|a| mentions_any(a, generics))
        }
        Type::Tuple(items) => items.iter().any(|t| mentions_any(t, generics)),
        Type::Closure { params, ret } => {
            params.iter().any(|(_, t)| mentions_any(t, generics)) || mentions_any(ret, generics)
        }
        Type::Function(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{TypeSymbol, TypeSymbolKind};
    use spp_ast::Span;

    struct Fixture {
        scopes: ScopeHandler,
        num: Type,
        str_: Type,
        t: TypeId,
        arr: TypeId,
    }

    fn fixture() -> Fixture {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        let mut declare = |name: &str, kind: TypeSymbolKind| {
            scopes
                .add_type(g, TypeSymbol { name: name.into(), kind, scope: None, bases: vec![], span: Span::default() })
                .unwrap()
        };
        let num = declare("Num", TypeSymbolKind::Class { generics: vec![] });
        let str_ = declare("Str", TypeSymbolKind::Class { generics: vec![] });
        let t = declare("T", TypeSymbolKind::Generic { constraints: vec![] });
        let arr = declare("Arr", TypeSymbolKind::Class { generics: vec!["T".into()] });
        Fixture { scopes, num: Type::named(num, "Num"), str_: Type::named(str_, "Str"), t, arr }
    }

    #[test]
    fn test_first_occurrence_binds() {
        let f = fixture();
        let t = Type::named(f.t, "T");
        let mut bindings = Bindings::new();
        types_equal_account_for_generic(&f.scopes, &[f.t], &t, &f.str_, &mut bindings).unwrap();
        types_equal_account_for_generic(&f.scopes, &[f.t], &t, &f.str_, &mut bindings).unwrap();
        assert_eq!(bindings.get(&f.t), Some(&f.str_));
    }

    #[test]
    fn test_conflicting_occurrence_is_rebind() {
        let f = fixture();
        let t = Type::named(f.t, "T");
        let mut bindings = Bindings::new();
        types_equal_account_for_generic(&f.scopes, &[f.t], &t, &f.str_, &mut bindings).unwrap();
        let err = types_equal_account_for_generic(&f.scopes, &[f.t], &t, &f.num, &mut bindings).unwrap_err();
        assert_eq!(
            err,
            SemanticErrorKind::GenericRebind { name: "T".into(), bound: "Str".into(), found: "Num".into() }
        );
    }

    #[test]
    fn test_generic_arguments_bind_positionally() {
        let f = fixture();
        let param = Type::Named { id: f.arr, name: "Arr".into(), generics: vec![Type::named(f.t, "T")] };
        let arg = Type::Named { id: f.arr, name: "Arr".into(), generics: vec![f.num.clone()] };
        let mut bindings = Bindings::new();
        types_equal_account_for_generic(&f.scopes, &[f.t], &param, &arg, &mut bindings).unwrap();
        assert_eq!(substitute(&Type::named(f.t, "T"), &bindings), f.num);

        let wrong = Type::Named { id: f.arr, name: "Arr".into(), generics: vec![] };
        assert!(types_equal_account_for_generic(&f.scopes, &[], &arg, &wrong, &mut Bindings::new()).is_err());
    }

    #[test]
    fn test_substitute_and_mentions() {
        let f = fixture();
        let tuple = Type::Tuple(vec![Type::named(f.t, "T"), f.num.clone()]);
        assert!(mentions_any(&tuple, &[f.t]));
        let mut bindings = Bindings::new();
        bindings.insert(f.t, f.str_.clone());
        let replaced = substitute(&tuple, &bindings);
        assert_eq!(replaced, Type::Tuple(vec![f.str_.clone(), f.num.clone()]));
        assert!(!mentions_any(&replaced, &[f.t]));
    }
}
