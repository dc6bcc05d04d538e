//! Statement checking methods

use spp_ast::{self as ast, Node, Span};

use crate::checker::Analyser;
use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::infer::pattern_names;
use crate::symbols::{MemoryStatus, TagSymbol, VarType, VariableKind, VariableSymbol};
use crate::types::Type;

impl<'s> Analyser<'s> {
    /// Analyses a braced block in its own scope. With `value_used`, the
    /// final expression statement gives the block its type.
    pub(crate) fn analyse_block(&mut self, block: &ast::Block, value_used: bool, span: Span) -> SemaResult<Type> {
        self.in_block(|this| this.analyse_statements(&block.stmts, value_used, span))
    }

    pub(crate) fn analyse_statements(
        &mut self,
        stmts: &[Node<ast::Stmt>],
        value_used: bool,
        span: Span,
    ) -> SemaResult<Type> {
        for (index, stmt) in stmts.iter().enumerate() {
            let last = index + 1 == stmts.len();
            match &stmt.value {
                ast::Stmt::Expr(expr) if last && value_used => return self.check_expr(expr),
                _ => self.analyse_stmt(stmt)?,
            }
        }
        self.scopes.void(span)
    }

    pub(crate) fn analyse_stmt(&mut self, stmt: &Node<ast::Stmt>) -> SemaResult<()> {
        match &stmt.value {
            ast::Stmt::Let(binding) => self.analyse_let(binding, stmt.span),
            ast::Stmt::Return(value) => self.analyse_return(value.as_ref(), stmt.span),
            ast::Stmt::Yield(value) => self.analyse_yield(value.as_ref(), stmt.span),
            ast::Stmt::Typedef(decl) => {
                let here = self.here();
                self.scopes.add_typedef(here, decl).map(|_| ())
            }
            ast::Stmt::While { condition, tag, body } => self.analyse_while(condition, tag.as_ref(), body),
            ast::Stmt::With { value, alias, body } => self.analyse_with(value, alias.as_ref(), body),
            ast::Stmt::Block(block) => self.analyse_block(block, false, stmt.span).map(|_| ()),
            ast::Stmt::Exit(tag) => self.analyse_loop_control("exit", tag.as_ref(), stmt.span),
            ast::Stmt::Skip(tag) => self.analyse_loop_control("skip", tag.as_ref(), stmt.span),
            ast::Stmt::Expr(expr) => match &expr.value {
                ast::Expr::If(if_expr) => self.check_if(if_expr, false, expr.span).map(|_| ()),
                _ => self.check_expr(expr).map(|_| ()),
            },
        }
    }

    // =========================================================================
    // Bindings
    // =========================================================================

    fn analyse_let(&mut self, binding: &ast::LetStmt, span: Span) -> SemaResult<()> {
        let here = self.here();
        let declared = match &binding.ty {
            Some(ty) => Some(self.scopes.resolve_type(ty, here)?),
            None => None,
        };

        let value_ty = match &binding.value {
            Some(value) => {
                let ty = self.check_expr(value)?;
                if let Some(expected) = &declared {
                    self.expect_type(expected, &ty, value.span)?;
                }
                self.move_value(value, &ty)?;
                Some(ty)
            }
            None => None,
        };

        let ty = match (declared, value_ty) {
            (Some(declared), _) => declared,
            (None, Some(found)) => found,
            (None, None) => {
                return Err(SemanticError::new(
                    SemanticErrorKind::MissingTypeAnnotation(pattern_names(&binding.pattern.value).join(", ")),
                    binding.pattern.span,
                ))
            }
        };
        if self.scopes.is_void(&ty) {
            let at = binding.value.as_ref().map_or(binding.pattern.span, |v| v.span);
            return Err(SemanticError::new(SemanticErrorKind::VoidBinding, at));
        }

        if let Some(fallback) = &binding.fallback {
            let found = self.check_expr(fallback)?;
            self.expect_type(&ty, &found, fallback.span)?;
            self.move_value(fallback, &found)?;
        }

        let initialised = binding.value.is_some();
        match &binding.pattern.value {
            ast::Pattern::Single(single) => self.declare_local(&single.name.name, single.is_mutable, ty, initialised, binding.pattern.span),
            ast::Pattern::Tuple(items) => {
                let elements = match ty {
                    Type::Tuple(elements) => elements,
                    other => {
                        return Err(SemanticError::new(SemanticErrorKind::NotATuple(other.to_string()), binding.pattern.span))
                    }
                };
                if elements.len() != items.len() {
                    return Err(SemanticError::new(
                        SemanticErrorKind::TupleArity { expected: elements.len(), found: items.len() },
                        binding.pattern.span,
                    ));
                }
                for (item, element) in items.iter().zip(elements) {
                    self.declare_local(&item.value.name.name, item.value.is_mutable, element, initialised, item.span)?;
                }
                tracing::trace!(names = items.len(), at = span.start, "tuple destructured");
                Ok(())
            }
        }
    }

    pub(crate) fn declare_local(&mut self, name: &str, is_mutable: bool, ty: Type, initialised: bool, span: Span) -> SemaResult<()> {
        let memory = if initialised { MemoryStatus::initialized(span) } else { MemoryStatus::default() };
        let variable = VariableSymbol::new(name, VarType::Known(ty), VariableKind::Local, span)
            .mutable(is_mutable)
            .with_memory(memory);
        let here = self.here();
        self.scopes.add_variable(here, variable)
    }

    // =========================================================================
    // Function exits
    // =========================================================================

    fn analyse_return(&mut self, value: Option<&Node<ast::Expr>>, span: Span) -> SemaResult<()> {
        let expected = self.function.as_ref().and_then(|f| f.ret.clone());
        match value {
            Some(value) => {
                let found = self.check_expr(value)?;
                self.move_value(value, &found)?;
                if let Some(expected) = expected {
                    self.expect_type(&expected, &found, value.span)?;
                }
            }
            None => {
                if let Some(expected) = expected {
                    let ends_generator = self.scopes.generator_item(&expected).is_some();
                    if !self.scopes.is_void(&expected) && !ends_generator {
                        return Err(SemanticError::new(
                            SemanticErrorKind::TypeMismatch { expected: expected.to_string(), found: "Void".into() },
                            span,
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    fn analyse_yield(&mut self, value: Option<&Node<ast::Expr>>, span: Span) -> SemaResult<()> {
        let context = self
            .function
            .clone()
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::InvalidYield("'gen' outside of a function".into()), span))?;
        let item = context
            .ret
            .as_ref()
            .and_then(|ret| self.scopes.generator_item(ret))
            .ok_or_else(|| {
                SemanticError::new(
                    SemanticErrorKind::InvalidYield(format!("'{}' does not return a generator 'Gen[T]'", context.name)),
                    span,
                )
            })?;

        let (found, at) = match value {
            Some(value) => {
                let found = self.check_expr(value)?;
                self.move_value(value, &found)?;
                (found, value.span)
            }
            None => (self.scopes.void(span)?, span),
        };
        self.expect_type(&item, &found, at)
    }

    // =========================================================================
    // Loops and context blocks
    // =========================================================================

    fn analyse_while(
        &mut self,
        condition: &Node<ast::Expr>,
        tag: Option<&Node<ast::Ident>>,
        body: &Node<ast::Block>,
    ) -> SemaResult<()> {
        let found = self.check_expr(condition)?;
        let expected = self.bool_type(condition.span)?;
        self.expect_type(&expected, &found, condition.span)?;

        self.loop_depth += 1;
        let result = self.in_block(|this| {
            if let Some(tag) = tag {
                let here = this.here();
                this.scopes.add_tag(here, TagSymbol { name: tag.value.name.clone(), span: tag.span })?;
            }
            this.analyse_statements(&body.value.stmts, false, body.span)
        });
        self.loop_depth -= 1;
        result.map(|_| ())
    }

    fn analyse_loop_control(&mut self, keyword: &'static str, tag: Option<&Node<ast::Ident>>, span: Span) -> SemaResult<()> {
        if self.loop_depth == 0 {
            return Err(SemanticError::new(SemanticErrorKind::OutsideLoop(keyword), span));
        }
        if let Some(tag) = tag {
            self.scopes.resolve_tag(self.here(), &tag.value.name, tag.span)?;
        }
        Ok(())
    }

    /// `with e as x { .. }`: `e` must offer `enter` and `leave`, and `x`
    /// takes the type `enter` returns.
    fn analyse_with(
        &mut self,
        value: &Node<ast::Expr>,
        alias: Option<&Node<ast::Ident>>,
        body: &Node<ast::Block>,
    ) -> SemaResult<()> {
        let manager = self.check_expr(value)?;
        let not_manager = || SemanticError::new(SemanticErrorKind::NotAContextManager(manager.to_string()), value.span);

        let class_scope = self.scopes.class_scope_of(&manager).ok_or_else(not_manager)?;
        for method in ["enter", "leave"] {
            let is_method = self
                .scopes
                .get_variable_exclusive(class_scope, method)
                .map_or(false, |v| v.kind == VariableKind::Function);
            if !is_method {
                return Err(not_manager());
            }
        }
        let enter = self.scopes.member_type(&manager, "enter", value.span)?;
        let entered = self.scopes.resolve_call(&enter, &[], &[], value.span)?.ret;
        let leave = self.scopes.member_type(&manager, "leave", value.span)?;
        self.scopes.resolve_call(&leave, &[], &[], value.span)?;

        self.in_block(|this| {
            if let Some(alias) = alias {
                this.declare_local(&alias.value.name, false, entered, true, alias.span)?;
            }
            this.analyse_statements(&body.value.stmts, false, body.span)
        })
        .map(|_| ())
    }
}
