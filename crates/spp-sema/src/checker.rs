//! Semantic analyser: walks each unit in lockstep with the scope tree

use spp_ast::{self as ast, Node, Span};

use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::scope::{ScopeHandler, ScopeKind};
use crate::symbol_gen::Unit;
use crate::symbols::{FunctionId, ScopeId};
use crate::types::Type;

/// Return context of the function or lambda being analysed
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub name: String,
    /// `None` inside a lambda without a declared return type
    pub ret: Option<Type>,
}

/// Semantic analyser
pub struct Analyser<'s> {
    pub(crate) scopes: &'s mut ScopeHandler,
    pub(crate) function: Option<FunctionContext>,
    pub(crate) loop_depth: usize,
    traversal: Vec<ScopeId>,
}

impl<'s> Analyser<'s> {
    pub fn new(scopes: &'s mut ScopeHandler) -> Self {
        Self {
            scopes,
            function: None,
            loop_depth: 0,
            traversal: Vec::new(),
        }
    }

    /// Scopes entered through `next_scope`, in order.
    pub fn into_traversal(self) -> Vec<ScopeId> {
        self.traversal
    }

    /// Analyses every unit in generation order.
    pub fn analyse_units(&mut self, units: &[Unit]) -> SemaResult<()> {
        for unit in units {
            self.analyse_unit(unit)?;
        }
        Ok(())
    }

    pub fn analyse_unit(&mut self, unit: &Unit) -> SemaResult<()> {
        let _span = tracing::info_span!("analyse", unit = %unit.name).entered();
        self.scopes.enter(unit.scope);
        for member in &unit.program.members {
            self.analyse_member(member)?;
        }
        tracing::debug!(unit = %unit.name, "unit analysed");
        Ok(())
    }

    fn analyse_member(&mut self, member: &Node<ast::ModuleMember>) -> SemaResult<()> {
        match &member.value {
            ast::ModuleMember::Function(decl) => {
                let id = self.enter_function(member.span)?;
                self.analyse_function(id, decl)?;
                self.leave();
            }
            ast::ModuleMember::Class(decl) => {
                self.enter_class(member.span)?;
                self.analyse_class(decl)?;
                self.leave();
            }
            ast::ModuleMember::Enum(decl) => {
                self.enter_class(member.span)?;
                self.check_type_decorators(&decl.decorators)?;
                self.leave();
            }
            ast::ModuleMember::Sup(decl) => {
                let sup_scope = self.enter_next(member.span)?;
                if !matches!(self.scopes.scope(sup_scope).kind, ScopeKind::Sup(_)) {
                    return Err(self.mismatch("sup block", sup_scope, member.span));
                }
                self.analyse_sup(decl)?;
                self.leave();
            }
            // Generated with the module; nothing left to check.
            ast::ModuleMember::Typedef(_) => {}
        }
        Ok(())
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    pub(crate) fn enter_next(&mut self, span: Span) -> SemaResult<ScopeId> {
        let id = self.scopes.next_scope().map_err(|e| SemanticError { span, ..e })?;
        self.traversal.push(id);
        Ok(id)
    }

    pub(crate) fn enter_function(&mut self, span: Span) -> SemaResult<FunctionId> {
        let scope = self.enter_next(span)?;
        match self.scopes.scope(scope).kind {
            ScopeKind::Function(id) => Ok(id),
            _ => Err(self.mismatch("function", scope, span)),
        }
    }

    fn enter_class(&mut self, span: Span) -> SemaResult<ScopeId> {
        let scope = self.enter_next(span)?;
        match self.scopes.scope(scope).kind {
            ScopeKind::Class(_) => Ok(scope),
            _ => Err(self.mismatch("class", scope, span)),
        }
    }

    pub(crate) fn leave(&mut self) {
        self.scopes.prev_scope();
    }

    fn mismatch(&self, expected: &str, found: ScopeId, span: Span) -> SemanticError {
        let scope = self.scopes.scope(found);
        tracing::error!(expected, found = %scope.name, "scope traversal out of step");
        SemanticError::new(
            SemanticErrorKind::TraversalMismatch(format!("expected a {} scope, entered '{}'", expected, scope.name)),
            span,
        )
    }

    /// Runs `f` inside a fresh block scope below the current one.
    pub(crate) fn in_block<T>(&mut self, f: impl FnOnce(&mut Self) -> SemaResult<T>) -> SemaResult<T> {
        self.scopes.into_new_scope("<block>", ScopeKind::Block);
        let result = f(self);
        self.scopes.exit_cur_scope();
        result
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    pub(crate) fn here(&self) -> ScopeId {
        self.scopes.current()
    }

    pub(crate) fn bool_type(&self, span: Span) -> SemaResult<Type> {
        self.scopes.std_type("Bool", span)
    }

    pub(crate) fn expect_type(&self, expected: &Type, found: &Type, span: Span) -> SemaResult<()> {
        if self.scopes.is_assignable(expected, found) {
            Ok(())
        } else {
            Err(SemanticError::new(
                SemanticErrorKind::TypeMismatch { expected: expected.to_string(), found: found.to_string() },
                span,
            ))
        }
    }
}
