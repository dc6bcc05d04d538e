//! Declaration checking: functions, classes, sup blocks and decorators

use spp_ast::{self as ast, Node};

use crate::checker::{Analyser, FunctionContext};
use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::scope::ScopeKind;
use crate::symbols::{FunctionFlags, FunctionId, MemoryStatus, VarType, VariableKind, VariableSymbol};

const VIRTUAL: &str = "virtual_method";
const ABSTRACT: &str = "abstract_method";
const STATIC: &str = "static_method";

impl<'s> Analyser<'s> {
    // =========================================================================
    // Functions
    // =========================================================================

    pub(crate) fn analyse_function(&mut self, id: FunctionId, decl: &ast::FunctionDecl) -> SemaResult<()> {
        let _span = tracing::debug_span!("function", name = %decl.name.value.name).entered();
        self.apply_decorators(id)?;
        let func = self.scopes.function(id).clone();

        match (func.flags.is_abstract, &decl.body) {
            (true, Some(_)) => {
                return Err(SemanticError::new(SemanticErrorKind::AbstractWithBody(func.name.clone()), func.span))
            }
            (false, None) => {
                return Err(SemanticError::new(SemanticErrorKind::MissingBody(func.name.clone()), func.span))
            }
            _ => {}
        }

        check_inferable_generics(decl)?;

        let mut params = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            params.push((param, self.scopes.param_type(&func, param)?));
        }
        let ret = match &decl.return_type {
            Some(ty) => self.scopes.resolve_type(ty, func.scope)?,
            None => self.scopes.void(func.span)?,
        };

        let body = match &decl.body {
            Some(body) => body,
            None => return Ok(()),
        };

        let saved_function = self.function.replace(FunctionContext { name: func.name.clone(), ret: Some(ret.clone()) });
        let saved_loops = std::mem::take(&mut self.loop_depth);

        let result = self.in_block(|this| {
            for (param, ty) in params {
                let here = this.here();
                let variable = VariableSymbol::new(param.name.value.name.clone(), VarType::Known(ty), VariableKind::Param, param.name.span)
                    .mutable(param.is_mutable)
                    .with_memory(MemoryStatus::borrowed(param.convention, param.name.span));
                this.scopes.add_variable(here, variable)?;
            }
            this.analyse_statements(&body.value.stmts, false, body.span)
        });

        self.function = saved_function;
        self.loop_depth = saved_loops;
        result?;

        let exempt = self.scopes.is_void(&ret) || self.scopes.generator_item(&ret).is_some();
        if !exempt && !ends_with_return(&body.value.stmts) {
            return Err(SemanticError::new(
                SemanticErrorKind::MissingReturn { name: func.name.clone(), ty: ret.to_string() },
                func.span,
            ));
        }
        Ok(())
    }

    /// Sets the virtual, abstract and static flags from `@meta.*`
    /// decorators. Applying twice is a no-op.
    pub(crate) fn apply_decorators(&mut self, id: FunctionId) -> SemaResult<()> {
        let func = self.scopes.function(id);
        if func.flags.decorators_applied {
            return Ok(());
        }
        let in_sup = matches!(self.scopes.scope(func.owner).kind, ScopeKind::Sup(_));

        let mut flags = FunctionFlags::default();
        for decorator in &func.decorators {
            if !decorator.value.is_meta() {
                continue;
            }
            let name = decorator.value.to_string();
            let invalid = |reason: &str| {
                SemanticError::new(
                    SemanticErrorKind::InvalidDecorator { decorator: name.clone(), reason: reason.to_string() },
                    decorator.span,
                )
            };
            match meta_name(&decorator.value) {
                Some(VIRTUAL) if in_sup => flags.is_virtual = true,
                Some(ABSTRACT) if in_sup => flags.is_abstract = true,
                Some(VIRTUAL) | Some(ABSTRACT) => return Err(invalid("only methods in a sup block can be overridden")),
                Some(STATIC) if func.is_method() => return Err(invalid("a static method cannot take 'self'")),
                Some(STATIC) => flags.is_static = true,
                _ => return Err(SemanticError::new(SemanticErrorKind::UnknownDecorator(name.clone()), decorator.span)),
            }
        }
        if flags.is_abstract && flags.is_static {
            return Err(SemanticError::new(
                SemanticErrorKind::InvalidDecorator {
                    decorator: format!("meta.{}", STATIC),
                    reason: "a static method cannot be abstract".to_string(),
                },
                func.span,
            ));
        }

        flags.decorators_applied = true;
        tracing::trace!(function = %func.name, ?flags, "decorators applied");
        self.scopes.function_mut(id).flags = flags;
        Ok(())
    }

    /// Classes and enums accept plain decorators only.
    pub(crate) fn check_type_decorators(&self, decorators: &[Node<ast::Decorator>]) -> SemaResult<()> {
        let decorator = match decorators.iter().find(|d| d.value.is_meta()) {
            Some(decorator) => decorator,
            None => return Ok(()),
        };
        let name = decorator.value.to_string();
        Err(match meta_name(&decorator.value) {
            Some(VIRTUAL) | Some(ABSTRACT) | Some(STATIC) => SemanticError::new(
                SemanticErrorKind::InvalidDecorator { decorator: name, reason: "only functions take it".into() },
                decorator.span,
            ),
            _ => SemanticError::new(SemanticErrorKind::UnknownDecorator(name), decorator.span),
        })
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub(crate) fn analyse_class(&mut self, decl: &ast::ClassDecl) -> SemaResult<()> {
        self.check_type_decorators(&decl.decorators)?;
        let class_scope = self.here();
        for attribute in &decl.attributes {
            self.check_type_decorators(&attribute.value.decorators)?;
            let ty = self.scopes.resolve_type(&attribute.value.ty, class_scope)?;
            if self.scopes.is_void(&ty) {
                return Err(SemanticError::new(SemanticErrorKind::VoidBinding, attribute.value.ty.span));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Sup blocks
    // =========================================================================

    pub(crate) fn analyse_sup(&mut self, decl: &ast::SupDecl) -> SemaResult<()> {
        self.check_type_decorators(&decl.decorators)?;
        let base = match &self.scopes.scope(self.here()).kind {
            ScopeKind::Sup(info) => info.base,
            _ => None,
        };

        for member in &decl.members {
            if let ast::SupMember::Function(function) = &member.value {
                let id = self.enter_function(member.span)?;
                let result = self
                    .analyse_function(id, function)
                    .and_then(|_| match (base, &decl.base) {
                        (Some(base), Some(base_ast)) => self.check_override(id, base, base_ast),
                        _ => Ok(()),
                    });
                self.leave();
                result?;
            }
        }
        Ok(())
    }

    /// A method in `sup X for Y` must replace a virtual or abstract method of `X`.
    fn check_override(
        &mut self,
        id: FunctionId,
        base: crate::symbols::TypeId,
        base_ast: &Node<ast::Type>,
    ) -> SemaResult<()> {
        let func = self.scopes.function(id);
        let (name, span) = (func.name.clone(), func.span);
        let invalid = |reason: &str| {
            SemanticError::new(
                SemanticErrorKind::InvalidOverride {
                    method: name.clone(),
                    base: base_ast.value.to_string(),
                    reason: reason.to_string(),
                },
                span,
            )
        };

        let base_scope = match self.scopes.type_symbol(base).scope {
            Some(scope) => scope,
            None => return Err(invalid("the base has no members")),
        };
        let candidates = self.scopes.collect_overloads(base_scope, &name);
        if candidates.is_empty() {
            return Err(invalid("the base declares no method of that name"));
        }
        for candidate in &candidates {
            self.apply_decorators(*candidate)?;
        }
        let overridable = candidates.iter().any(|c| {
            let flags = &self.scopes.function(*c).flags;
            flags.is_virtual || flags.is_abstract
        });
        if !overridable {
            return Err(invalid("the base method is neither virtual nor abstract"));
        }
        Ok(())
    }
}

fn meta_name(decorator: &ast::Decorator) -> Option<&str> {
    match decorator.path.as_slice() {
        [_, name] => Some(name.name.as_str()),
        _ => None,
    }
}

/// Every generic must appear in a parameter type or in another generic's
/// constraints, or no call could ever bind it.
fn check_inferable_generics(decl: &ast::FunctionDecl) -> SemaResult<()> {
    for generic in &decl.generics {
        let name = &generic.value.name.name;
        let in_params = decl
            .params
            .iter()
            .filter_map(|p| p.ty.as_ref())
            .any(|ty| mentions(&ty.value, name));
        let in_constraints = decl
            .generics
            .iter()
            .filter(|other| other.value.name.name != *name)
            .flat_map(|other| other.value.constraints.iter())
            .any(|ty| mentions(&ty.value, name));
        if !in_params && !in_constraints {
            return Err(SemanticError::new(SemanticErrorKind::UninferableGeneric(name.clone()), generic.span));
        }
    }
    Ok(())
}

fn mentions(ty: &ast::Type, name: &str) -> bool {
    match ty {
        ast::Type::Single(path) => {
            (path.len() == 1 && path[0].value.name.name == name)
                || path.iter().any(|part| part.value.generics.iter().any(|g| mentions(&g.value, name)))
        }
        ast::Type::Tuple(items) => items.iter().any(|item| mentions(&item.value, name)),
    }
}

/// The statements end in `ret value`, directly or in every branch.
pub(crate) fn ends_with_return(stmts: &[Node<ast::Stmt>]) -> bool {
    match stmts.last().map(|s| &s.value) {
        Some(ast::Stmt::Return(Some(_))) => true,
        Some(ast::Stmt::Block(block)) => ends_with_return(&block.stmts),
        Some(ast::Stmt::Expr(expr)) => expr_returns(&expr.value),
        _ => false,
    }
}

fn expr_returns(expr: &ast::Expr) -> bool {
    match expr {
        ast::Expr::If(if_expr) => {
            ends_with_return(&if_expr.then_branch.value.stmts)
                && if_expr.else_branch.as_ref().map_or(false, |e| expr_returns(&e.value))
        }
        ast::Expr::Block(block) => ends_with_return(&block.stmts),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fn(source: &str) -> ast::FunctionDecl {
        let program = spp_parser::parse_source(source, 0).unwrap();
        match &program.members[0].value {
            ast::ModuleMember::Function(f) => f.clone(),
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_generic_in_params_is_inferable() {
        assert!(check_inferable_generics(&parse_fn("fn f[T](x: Arr[T]) {}")).is_ok());
        assert!(check_inferable_generics(&parse_fn("fn f[T, U: Box[T]](x: U) {}")).is_ok());
    }

    #[test]
    fn test_generic_only_in_return_is_not_inferable() {
        let err = check_inferable_generics(&parse_fn("fn make[T]() -> T { ret make(); }")).unwrap_err();
        assert_eq!(err.kind, SemanticErrorKind::UninferableGeneric("T".into()));
    }

    #[test]
    fn test_return_through_both_branches() {
        let f = parse_fn("fn f(c: Bool) -> Num { if c { ret 1; } else { ret 2; } }");
        assert!(ends_with_return(&f.body.unwrap().value.stmts));

        let f = parse_fn("fn f(c: Bool) -> Num { if c { ret 1; } }");
        assert!(!ends_with_return(&f.body.unwrap().value.stmts));
    }
}
