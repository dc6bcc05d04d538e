//! Move and borrow checking
//!
//! Borrows live for a single call: each argument list gets fresh sets of
//! shared, exclusive and moved places, and two places conflict when one
//! member path is a prefix of the other. Moves persist: moving a variable
//! leaves it uninitialised until it is assigned again.

use std::fmt;

use spp_ast::{self as ast, Convention, Node, Span};

use crate::call::CallArg;
use crate::checker::Analyser;
use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::symbols::{MemoryStatus, ScopeId, VariableKind};
use crate::types::Type;

/// Root variable plus the member path below it: `a.b.0` is `a` with `[b, 0]`
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub root: String,
    pub path: Vec<String>,
    pub span: Span,
}

impl Place {
    pub fn overlaps(&self, other: &Place) -> bool {
        if self.root != other.root {
            return false;
        }
        let shared = self.path.len().min(other.path.len());
        self.path[..shared] == other.path[..shared]
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for segment in &self.path {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// Place named by an expression, if it names one at all.
pub fn place_of(expr: &Node<ast::Expr>) -> Option<Place> {
    match &expr.value {
        ast::Expr::Ident(ident) => Some(Place { root: ident.name.clone(), path: Vec::new(), span: expr.span }),
        ast::Expr::SelfValue => Some(Place { root: "self".into(), path: Vec::new(), span: expr.span }),
        ast::Expr::Postfix { base, op } => {
            let mut place = place_of(base)?;
            match op {
                ast::PostfixOp::Member(name) => place.path.push(name.value.name.clone()),
                ast::PostfixOp::TupleIndex(index) => place.path.push(index.value.to_string()),
                ast::PostfixOp::Call { .. } => return None,
            }
            place.span = expr.span;
            Some(place)
        }
        _ => None,
    }
}

/// Saved memory state, restored between the branches of an `if`
#[derive(Debug, Clone)]
pub(crate) struct MemorySnapshot {
    entries: Vec<(ScopeId, String, MemoryStatus)>,
}

/// Places claimed by the arguments of one call
#[derive(Debug, Default)]
pub(crate) struct CallBorrows {
    shared: Vec<Place>,
    exclusive: Vec<Place>,
    moved: Vec<Place>,
}

impl CallBorrows {
    fn find_overlap<'a>(place: &Place, sets: &[&'a [Place]]) -> Option<&'a Place> {
        sets.iter().flat_map(|set| set.iter()).find(|other| other.overlaps(place))
    }
}

impl<'s> Analyser<'s> {
    /// Reads a variable, rejecting moved and uninitialised values.
    pub(crate) fn check_use(&self, name: &str, span: Span) -> SemaResult<Type> {
        let (_, var) = self.scopes.resolve_variable(self.here(), name, span)?;
        if !var.memory.is_initialized {
            return Err(match var.memory.moved_at {
                Some(moved_at) => SemanticError::new(SemanticErrorKind::UseOfMovedValue(name.to_string()), span)
                    .with_note("value moved here", moved_at),
                None => SemanticError::new(SemanticErrorKind::UseOfUninitialised(name.to_string()), span)
                    .with_note("declared here", var.span),
            });
        }
        self.scopes.variable_type(var)
    }

    /// Checks the arguments of one call left to right, applying each
    /// argument's convention against the places claimed so far.
    pub(crate) fn check_call_args(&mut self, args: &[(Convention, &Node<ast::Expr>)]) -> SemaResult<Vec<CallArg>> {
        let mut borrows = CallBorrows::default();
        let mut checked = Vec::with_capacity(args.len());
        for (convention, expr) in args {
            let ty = self.check_expr(expr)?;
            self.claim(&mut borrows, *convention, expr, &ty)?;
            checked.push(CallArg::new(*convention, ty, expr.span));
        }
        Ok(checked)
    }

    /// Moves a value out of its place, as binding or returning it does.
    pub(crate) fn move_value(&mut self, expr: &Node<ast::Expr>, ty: &Type) -> SemaResult<()> {
        self.claim(&mut CallBorrows::default(), Convention::Move, expr, ty)
    }

    /// Memory state of every variable visible from the current scope.
    pub(crate) fn snapshot_memory(&self) -> MemorySnapshot {
        let mut entries = Vec::new();
        let mut cursor = Some(self.here());
        while let Some(id) = cursor {
            let scope = self.scopes.scope(id);
            entries.extend(scope.variables.iter().map(|(name, var)| (id, name.clone(), var.memory.clone())));
            cursor = scope.parent;
        }
        MemorySnapshot { entries }
    }

    pub(crate) fn restore_memory(&mut self, snapshot: &MemorySnapshot) {
        for (scope, name, memory) in &snapshot.entries {
            if let Some(var) = self.scopes.variable_mut(*scope, name) {
                var.memory = memory.clone();
            }
        }
    }

    /// Joins the state of another branch into the current one: a variable
    /// left uninitialised on either side stays uninitialised.
    pub(crate) fn merge_memory(&mut self, other: &MemorySnapshot) {
        for (scope, name, memory) in &other.entries {
            let var = match self.scopes.variable_mut(*scope, name) {
                Some(var) => var,
                None => continue,
            };
            if !memory.is_initialized && var.memory.is_initialized {
                var.memory.is_initialized = false;
                var.memory.moved_at = memory.moved_at;
            }
            var.memory.is_partially_moved |= memory.is_partially_moved;
        }
    }

    fn claim(&mut self, borrows: &mut CallBorrows, convention: Convention, expr: &Node<ast::Expr>, ty: &Type) -> SemaResult<()> {
        let place = match place_of(expr) {
            Some(place) => place,
            None => return Ok(()),
        };
        let (scope, var) = match self.scopes.locate_variable(self.here(), &place.root) {
            Some((scope, var)) => (scope, var.clone()),
            None => return Ok(()),
        };
        if matches!(var.kind, VariableKind::Function | VariableKind::EnumVariant) {
            return Ok(());
        }

        match convention {
            Convention::Move if self.scopes.is_copy(ty) => {
                if let Some(other) = CallBorrows::find_overlap(&place, &[borrows.exclusive.as_slice()]) {
                    return Err(conflict(&place, "shared", other));
                }
                borrows.shared.push(place);
            }
            Convention::Move => {
                if var.memory.is_borrowed_ref || var.memory.is_borrowed_mut {
                    let mut error = SemanticError::new(SemanticErrorKind::MoveWhileBorrowed(place.to_string()), place.span);
                    if let Some(at) = var.memory.borrowed_at {
                        error = error.with_note("borrowed here", at);
                    }
                    return Err(error);
                }
                if let Some(other) = CallBorrows::find_overlap(&place, &[borrows.shared.as_slice(), borrows.exclusive.as_slice()]) {
                    return Err(SemanticError::new(SemanticErrorKind::MoveWhileBorrowed(place.to_string()), place.span)
                        .with_note(format!("'{}' is borrowed by this argument", other), other.span));
                }
                if let Some(status) = self.scopes.variable_mut(scope, &place.root).map(|v| &mut v.memory) {
                    status.is_initialized = false;
                    status.moved_at = Some(place.span);
                    if !place.path.is_empty() {
                        status.is_partially_moved = true;
                    }
                }
                tracing::trace!(place = %place, "moved");
                borrows.moved.push(place);
            }
            Convention::Ref => {
                if let Some(other) = CallBorrows::find_overlap(&place, &[borrows.exclusive.as_slice(), borrows.moved.as_slice()]) {
                    return Err(conflict(&place, "shared", other));
                }
                borrows.shared.push(place);
            }
            Convention::Mut => {
                if !var.is_mutable_place() || var.memory.is_borrowed_ref {
                    return Err(SemanticError::new(SemanticErrorKind::MutBorrowOfImmutable(place.to_string()), place.span)
                        .with_note("declared here", var.span));
                }
                if let Some(other) =
                    CallBorrows::find_overlap(&place, &[borrows.shared.as_slice(), borrows.exclusive.as_slice(), borrows.moved.as_slice()])
                {
                    return Err(conflict(&place, "mutable", other));
                }
                borrows.exclusive.push(place);
            }
        }
        Ok(())
    }
}

fn conflict(place: &Place, kind: &'static str, other: &Place) -> SemanticError {
    SemanticError::new(
        SemanticErrorKind::BorrowConflict { path: place.to_string(), kind, other: other.to_string() },
        place.span,
    )
    .with_note("conflicting argument", other.span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(root: &str, path: &[&str]) -> Place {
        Place { root: root.into(), path: path.iter().map(|s| s.to_string()).collect(), span: Span::default() }
    }

    #[test]
    fn test_prefix_paths_overlap() {
        assert!(place("a", &[]).overlaps(&place("a", &["b"])));
        assert!(place("a", &["b", "c"]).overlaps(&place("a", &["b"])));
        assert!(place("a", &["b"]).overlaps(&place("a", &["b"])));
    }

    #[test]
    fn test_disjoint_paths_do_not_overlap() {
        assert!(!place("a", &["b"]).overlaps(&place("a", &["c"])));
        assert!(!place("a", &[]).overlaps(&place("b", &[])));
    }

    #[test]
    fn test_place_of_member_chain() {
        let program = spp_parser::parse_source("fn f() { a.b.0; g(); }", 0).unwrap();
        let stmts = match &program.members[0].value {
            ast::ModuleMember::Function(f) => f.body.as_ref().unwrap().value.stmts.clone(),
            other => panic!("Expected function, got {:?}", other),
        };
        let expr = |i: usize| match &stmts[i].value {
            ast::Stmt::Expr(e) => e.clone(),
            other => panic!("Unexpected {:?}", other),
        };
        assert_eq!(place_of(&expr(0)).unwrap().to_string(), "a.b.0");
        assert!(place_of(&expr(1)).is_none());
    }
}
