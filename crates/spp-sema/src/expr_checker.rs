//! Expression checking methods
//!
//! `check_expr` types an expression like the inferrer does, and also
//! enforces the rules that depend on analysis state: uses of moved
//! values, borrows at call sites and assignment targets.

use spp_ast::{self as ast, Convention, Node, Span};

use crate::borrow::place_of;
use crate::checker::{Analyser, FunctionContext};
use crate::decl_checker::ends_with_return;
use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::infer::FieldValue;
use crate::symbols::{MemoryStatus, VarType, VariableKind, VariableSymbol};
use crate::types::Type;

impl<'s> Analyser<'s> {
    pub(crate) fn check_expr(&mut self, expr: &Node<ast::Expr>) -> SemaResult<Type> {
        let span = expr.span;
        match &expr.value {
            ast::Expr::Literal(literal) => self.check_literal(literal, span),
            ast::Expr::Ident(ident) => self.check_use(&ident.name, span),
            ast::Expr::SelfValue => self.check_use("self", span),
            ast::Expr::Binary { op, left, right } => {
                let left_ty = self.check_expr(left)?;
                let mut args = self.check_call_args(&[(Convention::Move, right.as_ref())])?;
                self.scopes.binary_type(*op, &left_ty, args.remove(0), span)
            }
            ast::Expr::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand)?;
                self.scopes.unary_type(*op, &operand_ty, span)
            }
            ast::Expr::Postfix { base, op } => self.check_postfix(base, op, span),
            ast::Expr::StructInit { ty, fields, default } => {
                self.check_struct_init(ty, fields, default.as_deref(), span)
            }
            ast::Expr::Assign { op, target, value } => self.check_assign(*op, target, value, span),
            ast::Expr::Lambda(lambda) => self.check_lambda(lambda),
            ast::Expr::If(if_expr) => self.check_if(if_expr, true, span),
            ast::Expr::Block(block) => self.analyse_block(block, true, span),
            ast::Expr::Placeholder => Err(SemanticError::new(
                SemanticErrorKind::Unsupported("placeholder '_' in expression position".into()),
                span,
            )),
        }
    }

    fn check_literal(&mut self, literal: &ast::Literal, span: Span) -> SemaResult<Type> {
        match literal {
            ast::Literal::Tuple(items) => {
                let mut types = Vec::with_capacity(items.len());
                for item in items {
                    let ty = self.check_expr(item)?;
                    self.move_value(item, &ty)?;
                    types.push(ty);
                }
                Ok(Type::Tuple(types))
            }
            ast::Literal::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    let ty = self.check_expr(item)?;
                    self.move_value(item, &ty)?;
                    elements.push((ty, item.span));
                }
                self.scopes.array_type(&elements, span)
            }
            other => self.scopes.literal_type(other, span),
        }
    }

    fn check_postfix(&mut self, base: &Node<ast::Expr>, op: &ast::PostfixOp, span: Span) -> SemaResult<Type> {
        match op {
            ast::PostfixOp::Member(name) => {
                if let ast::Expr::Ident(ident) = &base.value {
                    if let Some(owner) = self.scopes.type_name_value(self.here(), &ident.name, base.span) {
                        return self.scopes.static_member_type(&owner, &name.value.name, name.span);
                    }
                }
                let base_ty = self.check_expr(base)?;
                self.scopes.member_type(&base_ty, &name.value.name, name.span)
            }
            ast::PostfixOp::TupleIndex(index) => {
                let base_ty = self.check_expr(base)?;
                self.scopes.tuple_index_type(&base_ty, index.value, index.span)
            }
            ast::PostfixOp::Call { generics, args } => {
                let callee = self.check_expr(base)?;
                let here = self.here();
                let explicit = generics
                    .iter()
                    .map(|g| self.scopes.resolve_type(g, here))
                    .collect::<SemaResult<Vec<_>>>()?;
                let args: Vec<(Convention, &Node<ast::Expr>)> =
                    args.iter().map(|a| (a.value.convention, &a.value.value)).collect();
                let checked = self.check_call_args(&args)?;
                let resolved = self.scopes.resolve_call(&callee, &explicit, &checked, span)?;
                if let Some(function) = resolved.function {
                    tracing::trace!(callee = %callee, signature = %self.scopes.function(function).signature(), "call resolved");
                }
                Ok(resolved.ret)
            }
        }
    }

    fn check_struct_init(
        &mut self,
        ty: &Node<ast::Type>,
        fields: &[ast::FieldInit],
        default: Option<&Node<ast::Expr>>,
        span: Span,
    ) -> SemaResult<Type> {
        let mut values = Vec::with_capacity(fields.len());
        for field in fields {
            let shorthand;
            let value = match &field.value {
                Some(value) => value,
                None => {
                    shorthand = Node::new(ast::Expr::Ident(field.name.value.clone()), field.name.span);
                    &shorthand
                }
            };
            let found = self.check_expr(value)?;
            self.move_value(value, &found)?;
            values.push(FieldValue { name: field.name.value.name.clone(), ty: found, span: value.span });
        }

        let here = self.here();
        let built = self.scopes.struct_init_type(ty, &values, default.is_some(), here, span)?;
        if let Some(default) = default {
            let found = self.check_expr(default)?;
            self.expect_type(&built, &found, default.span)?;
            self.move_value(default, &found)?;
        }
        Ok(built)
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    /// `target = value`, or `target op= value` as `target = target.op(value)`.
    fn check_assign(
        &mut self,
        op: ast::AssignOp,
        target: &Node<ast::Expr>,
        value: &Node<ast::Expr>,
        span: Span,
    ) -> SemaResult<Type> {
        let place = place_of(target)
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::InvalidAssignTarget, target.span))?;
        let (root_scope, root) = {
            let (scope, var) = self.scopes.resolve_variable(self.here(), &place.root, target.span)?;
            (scope, var.clone())
        };
        let bare = place.path.is_empty();

        let target_ty = match op.binary() {
            None if bare => self.scopes.variable_type(&root)?,
            _ => self.check_expr(target)?,
        };
        let value_ty = match op.binary() {
            Some(binary) => {
                let mut args = self.check_call_args(&[(Convention::Move, value)])?;
                self.scopes.binary_type(binary, &target_ty, args.remove(0), span)?
            }
            None => self.check_call_args(&[(Convention::Move, value)])?.remove(0).ty,
        };

        if root.kind == VariableKind::Function || root.kind == VariableKind::EnumVariant {
            return Err(SemanticError::new(SemanticErrorKind::InvalidAssignTarget, target.span));
        }
        let first_initialisation = bare && root.memory.initialized_at.is_none() && !root.memory.is_initialized;
        let writable = root.is_mutable_place() && !root.memory.is_borrowed_ref;
        if !first_initialisation && !writable {
            return Err(SemanticError::new(SemanticErrorKind::AssignToImmutable(place.to_string()), target.span)
                .with_note("declared here", root.span));
        }
        self.expect_type(&target_ty, &value_ty, value.span)?;

        if bare {
            if let Some(var) = self.scopes.variable_mut(root_scope, &place.root) {
                var.memory.is_initialized = true;
                var.memory.is_partially_moved = false;
                var.memory.initialized_at = Some(span);
            }
        }
        self.scopes.void(span)
    }

    // =========================================================================
    // Lambdas and conditionals
    // =========================================================================

    fn check_lambda(&mut self, lambda: &ast::LambdaExpr) -> SemaResult<Type> {
        let here = self.here();
        let params = self.scopes.closure_type(&lambda.params, here)?;
        let declared = match &lambda.return_type {
            Some(ty) => Some(self.scopes.resolve_type(ty, here)?),
            None => None,
        };

        let saved_function = self.function.replace(FunctionContext { name: "<lambda>".into(), ret: declared.clone() });
        let saved_loops = std::mem::take(&mut self.loop_depth);
        let body = self.in_block(|this| {
            for (param, (convention, ty)) in lambda.params.iter().zip(&params) {
                let here = this.here();
                let variable = VariableSymbol::new(
                    param.name.value.name.clone(),
                    VarType::Known(ty.clone()),
                    VariableKind::Param,
                    param.name.span,
                )
                .mutable(param.is_mutable)
                .with_memory(MemoryStatus::borrowed(*convention, param.name.span));
                this.scopes.add_variable(here, variable)?;
            }
            this.check_expr(&lambda.body)
        });
        self.function = saved_function;
        self.loop_depth = saved_loops;
        let body = body?;

        let ret = match declared {
            Some(declared) => {
                let returns_explicitly = match &lambda.body.value {
                    ast::Expr::Block(block) => ends_with_return(&block.stmts),
                    _ => false,
                };
                if !returns_explicitly {
                    self.expect_type(&declared, &body, lambda.body.span)?;
                }
                declared
            }
            None => body,
        };
        Ok(Type::Closure { params, ret: Box::new(ret) })
    }

    /// With `value_used`, every branch must produce the same type and an
    /// `else` is required.
    pub(crate) fn check_if(&mut self, if_expr: &ast::IfExpr, value_used: bool, span: Span) -> SemaResult<Type> {
        let condition = self.check_expr(&if_expr.condition)?;
        let expected = self.bool_type(if_expr.condition.span)?;
        self.expect_type(&expected, &condition, if_expr.condition.span)?;

        let before = self.snapshot_memory();
        let then_ty = self.analyse_block(&if_expr.then_branch.value, value_used, if_expr.then_branch.span)?;
        let else_branch = match &if_expr.else_branch {
            Some(branch) => branch,
            None if value_used => return Err(SemanticError::new(SemanticErrorKind::IfMissingElse, span)),
            None => return self.scopes.void(span),
        };

        // Each branch starts from the state before the `if`.
        let after_then = self.snapshot_memory();
        self.restore_memory(&before);
        let else_ty = match &else_branch.value {
            ast::Expr::If(nested) => self.check_if(nested, value_used, else_branch.span)?,
            ast::Expr::Block(block) => self.analyse_block(block, value_used, else_branch.span)?,
            _ => self.check_expr(else_branch)?,
        };
        self.merge_memory(&after_then);

        if !value_used {
            return self.scopes.void(span);
        }
        if then_ty != else_ty {
            return Err(SemanticError::new(
                SemanticErrorKind::BranchTypeMismatch { first: then_ty.to_string(), other: else_ty.to_string() },
                else_branch.span,
            ));
        }
        Ok(then_ty)
    }
}
