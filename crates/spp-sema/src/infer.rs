//! Type inference
//!
//! Everything here is read-only with respect to the scope arena: inferring
//! an expression never touches memory state. The analyser builds on the
//! same helpers while it walks expressions with side effects.

use std::collections::BTreeMap;

use spp_ast::{self as ast, Convention, Node, Span};

use crate::call::CallArg;
use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::scope::ScopeHandler;
use crate::symbols::{ScopeId, VariableKind};
use crate::types::{FunctionRef, Type};
use crate::unify::{self, Bindings};

/// A field value at a struct initializer
#[derive(Debug, Clone)]
pub struct FieldValue {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

impl ScopeHandler {
    // =========================================================================
    // Building blocks
    // =========================================================================

    pub fn literal_type(&self, literal: &ast::Literal, span: Span) -> SemaResult<Type> {
        match literal {
            ast::Literal::Number(_) => self.std_type("Num", span),
            ast::Literal::String(_) => self.std_type("Str", span),
            ast::Literal::Bool(_) => self.std_type("Bool", span),
            ast::Literal::Regex(_) => self.std_type("Rgx", span),
            ast::Literal::Tuple(_) | ast::Literal::Array(_) => Err(SemanticError::new(
                SemanticErrorKind::Unsupported("compound literal without element types".into()),
                span,
            )),
        }
    }

    /// `Arr[T]` from element types; every element must share the first one's type.
    pub fn array_type(&self, elements: &[(Type, Span)], span: Span) -> SemaResult<Type> {
        let (first, _) = elements
            .first()
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::EmptyArray, span))?;
        for (ty, element_span) in &elements[1..] {
            if ty != first {
                return Err(SemanticError::new(
                    SemanticErrorKind::TypeMismatch { expected: first.to_string(), found: ty.to_string() },
                    *element_span,
                ));
            }
        }
        self.std_generic("Arr", first.clone(), span)
    }

    /// Reads `name` on a value of type `receiver`.
    pub fn member_type(&self, receiver: &Type, name: &str, span: Span) -> SemaResult<Type> {
        self.member_access(receiver, name, true, span)
    }

    /// Reads `name` through the type itself, as in `Color.Red` or `Point.origin`.
    pub fn static_member_type(&self, owner: &Type, name: &str, span: Span) -> SemaResult<Type> {
        self.member_access(owner, name, false, span)
    }

    fn member_access(&self, receiver: &Type, name: &str, on_instance: bool, span: Span) -> SemaResult<Type> {
        let unknown = || {
            let mut error = SemanticError::new(
                SemanticErrorKind::UnknownAttribute { ty: receiver.to_string(), attribute: name.to_string() },
                span,
            );
            if let Some(scope) = self.class_scope_of(receiver) {
                if let Some(similar) = crate::suggest::closest(name, &self.member_names(scope)) {
                    error = error.with_help(format!("did you mean '{}'?", similar));
                }
            }
            error
        };

        let class_scope = self.class_scope_of(receiver).ok_or_else(unknown)?;
        let member = self.get_variable_exclusive(class_scope, name).ok_or_else(unknown)?;

        match member.kind {
            VariableKind::Function => Ok(Type::Function(FunctionRef {
                name: name.to_string(),
                scope: class_scope,
                receiver: Some(Box::new(receiver.clone())),
                bound: on_instance,
            })),
            VariableKind::Attribute if on_instance => self.attribute_type(receiver, member),
            VariableKind::EnumVariant => self.variable_type(member),
            _ => Err(unknown()),
        }
    }

    /// Structural tuple access `t.0`.
    pub fn tuple_index_type(&self, ty: &Type, index: usize, span: Span) -> SemaResult<Type> {
        match ty {
            Type::Tuple(items) => items.get(index).cloned().ok_or_else(|| {
                SemanticError::new(SemanticErrorKind::TupleIndexOutOfRange { index, ty: ty.to_string() }, span)
            }),
            other => Err(SemanticError::new(SemanticErrorKind::NotATuple(other.to_string()), span)),
        }
    }

    /// Operator call `left op right`, lowered to `left.method(right)`.
    pub fn binary_type(&self, op: ast::BinaryOp, left: &Type, right: CallArg, span: Span) -> SemaResult<Type> {
        let method = self.member_type(left, op.method_name(), span)?;
        Ok(self.resolve_call(&method, &[], &[right], span)?.ret)
    }

    pub fn unary_type(&self, op: ast::UnaryOp, operand: &Type, span: Span) -> SemaResult<Type> {
        let method = self.member_type(operand, op.method_name(), span)?;
        Ok(self.resolve_call(&method, &[], &[], span)?.ret)
    }

    /// Class type built by `Type { field: value, .. }`.
    ///
    /// Every attribute must be given exactly once unless an `else` default
    /// object fills the rest. Class generics not written on the type are
    /// inferred from the field values.
    pub fn struct_init_type(
        &self,
        ty: &Node<ast::Type>,
        fields: &[FieldValue],
        has_default: bool,
        scope: ScopeId,
        span: Span,
    ) -> SemaResult<Type> {
        let declared = self.resolve_type_lenient(ty, scope)?;
        let class_id = declared
            .id()
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::NotCallable(declared.to_string()), ty.span))?;
        let class_scope = self
            .class_scope_of(&declared)
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::UnknownType(declared.to_string()), ty.span))?;

        let attributes: BTreeMap<&String, _> = self
            .scope(class_scope)
            .variables
            .iter()
            .filter(|(_, v)| v.kind == VariableKind::Attribute)
            .collect();

        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates = Vec::new();
        let mut unknown = Vec::new();
        for field in fields {
            if seen.contains(&field.name.as_str()) {
                duplicates.push(field.name.clone());
            } else if !attributes.contains_key(&field.name) {
                unknown.push(field.name.clone());
            }
            seen.push(&field.name);
        }
        if !duplicates.is_empty() {
            return Err(SemanticError::new(SemanticErrorKind::DuplicateFields(duplicates.join(", ")), span));
        }
        if !unknown.is_empty() {
            return Err(SemanticError::new(SemanticErrorKind::UnknownFields(unknown.join(", ")), span));
        }
        if !has_default {
            let missing: Vec<&str> = attributes
                .keys()
                .filter(|name| !seen.contains(&name.as_str()))
                .map(|name| name.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(SemanticError::new(SemanticErrorKind::MissingFields(missing.join(", ")), span));
            }
        }

        let class_generics = self.class_generic_ids(class_id);
        let mut bindings: Bindings = class_generics.iter().copied().zip(declared.generics().iter().cloned()).collect();
        for field in fields {
            if let Some(attribute) = attributes.get(&field.name) {
                let expected = self.variable_type(attribute)?;
                unify::types_equal_account_for_generic(self, &class_generics, &expected, &field.ty, &mut bindings)
                    .map_err(|kind| SemanticError::new(kind, field.span))?;
            }
        }

        let mut generics = Vec::with_capacity(class_generics.len());
        let mut unbound = Vec::new();
        for id in &class_generics {
            match bindings.get(id) {
                Some(bound) => generics.push(bound.clone()),
                None => unbound.push(self.type_symbol(*id).name.clone()),
            }
        }
        if !unbound.is_empty() {
            return Err(SemanticError::new(
                SemanticErrorKind::MissingGenerics { name: declared.to_string(), missing: unbound.join(", ") },
                ty.span,
            ));
        }

        Ok(Type::Named { id: class_id, name: self.type_symbol(class_id).name.clone(), generics })
    }

    /// Type named by a bare identifier used as a static-access base, if it
    /// is a type and not shadowed by a variable.
    pub fn type_name_value(&self, scope: ScopeId, name: &str, span: Span) -> Option<Type> {
        if self.get_variable(scope, name).is_some() {
            return None;
        }
        let id = self.get_type(scope, name)?;
        self.instantiate(id, Vec::new(), false, span).ok()
    }

    pub fn closure_type(&self, params: &[ast::Param], scope: ScopeId) -> SemaResult<Vec<(Convention, Type)>> {
        params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => Ok((param.convention, self.resolve_type(ty, scope)?)),
                None => Err(SemanticError::new(
                    SemanticErrorKind::MissingTypeAnnotation(param.name.value.name.clone()),
                    param.name.span,
                )),
            })
            .collect()
    }
}

// =============================================================================
// Pure expression inference
// =============================================================================

/// Infers expression types without touching the scope arena. Bindings
/// introduced inside block and lambda expressions live in an overlay.
pub struct Inferrer<'a> {
    scopes: &'a ScopeHandler,
    scope: ScopeId,
    locals: Vec<(String, Type)>,
}

impl<'a> Inferrer<'a> {
    pub fn new(scopes: &'a ScopeHandler, scope: ScopeId) -> Self {
        Self { scopes, scope, locals: Vec::new() }
    }

    pub fn infer(&mut self, expr: &Node<ast::Expr>) -> SemaResult<Type> {
        let span = expr.span;
        match &expr.value {
            ast::Expr::Literal(literal) => self.infer_literal(literal, span),
            ast::Expr::Ident(ident) => self.lookup(&ident.name, span),
            ast::Expr::SelfValue => self.lookup("self", span),
            ast::Expr::Binary { op, left, right } => {
                let left_ty = self.infer(left)?;
                let right_ty = self.infer(right)?;
                self.scopes
                    .binary_type(*op, &left_ty, CallArg::new(Convention::Move, right_ty, right.span), span)
            }
            ast::Expr::Unary { op, operand } => {
                let operand_ty = self.infer(operand)?;
                self.scopes.unary_type(*op, &operand_ty, span)
            }
            ast::Expr::Postfix { base, op } => self.infer_postfix(base, op, span),
            ast::Expr::StructInit { ty, fields, default } => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    let ty = match &field.value {
                        Some(value) => self.infer(value)?,
                        None => self.lookup(&field.name.value.name, field.name.span)?,
                    };
                    values.push(FieldValue { name: field.name.value.name.clone(), ty, span: field.name.span });
                }
                self.scopes.struct_init_type(ty, &values, default.is_some(), self.scope, span)
            }
            ast::Expr::Assign { .. } => self.scopes.void(span),
            ast::Expr::Lambda(lambda) => {
                let params = self.scopes.closure_type(&lambda.params, self.scope)?;
                let ret = match &lambda.return_type {
                    Some(ty) => self.scopes.resolve_type(ty, self.scope)?,
                    None => {
                        let mark = self.locals.len();
                        for (param, (_, ty)) in lambda.params.iter().zip(&params) {
                            self.locals.push((param.name.value.name.clone(), ty.clone()));
                        }
                        let body = self.infer(&lambda.body);
                        self.locals.truncate(mark);
                        body?
                    }
                };
                Ok(Type::Closure { params, ret: Box::new(ret) })
            }
            ast::Expr::If(if_expr) => self.infer_if(if_expr, span),
            ast::Expr::Block(block) => self.infer_block(block, span),
            ast::Expr::Placeholder => Err(SemanticError::new(
                SemanticErrorKind::Unsupported("placeholder '_' in expression position".into()),
                span,
            )),
        }
    }

    fn lookup(&self, name: &str, span: Span) -> SemaResult<Type> {
        if let Some((_, ty)) = self.locals.iter().rev().find(|(local, _)| local == name) {
            return Ok(ty.clone());
        }
        let (_, var) = self.scopes.resolve_variable(self.scope, name, span)?;
        self.scopes.variable_type(var)
    }

    fn infer_literal(&mut self, literal: &ast::Literal, span: Span) -> SemaResult<Type> {
        match literal {
            ast::Literal::Tuple(items) => items
                .iter()
                .map(|item| self.infer(item))
                .collect::<SemaResult<Vec<_>>>()
                .map(Type::Tuple),
            ast::Literal::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push((self.infer(item)?, item.span));
                }
                self.scopes.array_type(&elements, span)
            }
            other => self.scopes.literal_type(other, span),
        }
    }

    fn infer_postfix(&mut self, base: &Node<ast::Expr>, op: &ast::PostfixOp, span: Span) -> SemaResult<Type> {
        match op {
            ast::PostfixOp::Member(name) => {
                if let ast::Expr::Ident(ident) = &base.value {
                    let shadowed = self.locals.iter().any(|(local, _)| local == &ident.name);
                    if !shadowed {
                        if let Some(owner) = self.scopes.type_name_value(self.scope, &ident.name, base.span) {
                            return self.scopes.static_member_type(&owner, &name.value.name, name.span);
                        }
                    }
                }
                let base_ty = self.infer(base)?;
                self.scopes.member_type(&base_ty, &name.value.name, name.span)
            }
            ast::PostfixOp::TupleIndex(index) => {
                let base_ty = self.infer(base)?;
                self.scopes.tuple_index_type(&base_ty, index.value, index.span)
            }
            ast::PostfixOp::Call { generics, args } => {
                let callee = self.infer(base)?;
                let explicit = generics
                    .iter()
                    .map(|g| self.scopes.resolve_type(g, self.scope))
                    .collect::<SemaResult<Vec<_>>>()?;
                let mut call_args = Vec::with_capacity(args.len());
                for arg in args {
                    let ty = self.infer(&arg.value.value)?;
                    call_args.push(CallArg::new(arg.value.convention, ty, arg.span));
                }
                Ok(self.scopes.resolve_call(&callee, &explicit, &call_args, span)?.ret)
            }
        }
    }

    fn infer_if(&mut self, if_expr: &ast::IfExpr, span: Span) -> SemaResult<Type> {
        let then_ty = self.infer_block(&if_expr.then_branch.value, if_expr.then_branch.span)?;
        let else_branch = if_expr
            .else_branch
            .as_ref()
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::IfMissingElse, span))?;
        let else_ty = self.infer(else_branch)?;
        if then_ty != else_ty {
            return Err(SemanticError::new(
                SemanticErrorKind::BranchTypeMismatch { first: then_ty.to_string(), other: else_ty.to_string() },
                else_branch.span,
            ));
        }
        Ok(then_ty)
    }

    /// Type of the final expression statement, or `Void`.
    fn infer_block(&mut self, block: &ast::Block, span: Span) -> SemaResult<Type> {
        let mark = self.locals.len();
        let result = self.infer_statements(&block.stmts, span);
        self.locals.truncate(mark);
        result
    }

    fn infer_statements(&mut self, stmts: &[Node<ast::Stmt>], span: Span) -> SemaResult<Type> {
        for (index, stmt) in stmts.iter().enumerate() {
            let last = index + 1 == stmts.len();
            match &stmt.value {
                ast::Stmt::Let(binding) => self.bind_let(binding)?,
                ast::Stmt::Expr(expr) if last => return self.infer(expr),
                _ => {}
            }
        }
        self.scopes.void(span)
    }

    fn bind_let(&mut self, binding: &ast::LetStmt) -> SemaResult<()> {
        let ty = match (&binding.ty, &binding.value) {
            (Some(ty), _) => self.scopes.resolve_type(ty, self.scope)?,
            (None, Some(value)) => self.infer(value)?,
            (None, None) => {
                return Err(SemanticError::new(
                    SemanticErrorKind::MissingTypeAnnotation(pattern_names(&binding.pattern.value).join(", ")),
                    binding.pattern.span,
                ))
            }
        };
        match &binding.pattern.value {
            ast::Pattern::Single(single) => self.locals.push((single.name.name.clone(), ty)),
            ast::Pattern::Tuple(items) => {
                let elements = match &ty {
                    Type::Tuple(elements) if elements.len() == items.len() => elements.clone(),
                    Type::Tuple(elements) => {
                        return Err(SemanticError::new(
                            SemanticErrorKind::TupleArity { expected: elements.len(), found: items.len() },
                            binding.pattern.span,
                        ))
                    }
                    other => {
                        return Err(SemanticError::new(
                            SemanticErrorKind::NotATuple(other.to_string()),
                            binding.pattern.span,
                        ))
                    }
                };
                for (item, ty) in items.iter().zip(elements) {
                    self.locals.push((item.value.name.name.clone(), ty));
                }
            }
        }
        Ok(())
    }
}

/// Infers `expr` in `scope`.
pub fn infer_expression(scopes: &ScopeHandler, expr: &Node<ast::Expr>, scope: ScopeId) -> SemaResult<Type> {
    Inferrer::new(scopes, scope).infer(expr)
}

pub(crate) fn pattern_names(pattern: &ast::Pattern) -> Vec<String> {
    match pattern {
        ast::Pattern::Single(binding) => vec![binding.name.name.clone()],
        ast::Pattern::Tuple(items) => items.iter().map(|b| b.value.name.name.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate_symbols, MemoryLoader, SourceMap};

    const CONTEXT: &str = "
        cls Point { x: Num; y: Num; }
        cls Box[T] { value: T; }
        enum Color { Red, Green }
        fn f(x: Num) -> Num { ret x; }
        fn f(x: Str) -> Str { ret x; }
    ";

    /// Infers the last expression statement of `sample` in the global scope.
    fn infer_in_context(expr: &str) -> SemaResult<Type> {
        let source = format!("{}\nfn sample() {{ {}; }}", CONTEXT, expr);
        let mut sources = SourceMap::new();
        let file_id = sources.add("main.spp", source.as_str());
        let program = spp_parser::parse_source(&source, file_id).expect("test source must parse");
        let expr = match program.members.last().map(|m| &m.value) {
            Some(ast::ModuleMember::Function(sample)) => match sample.body.as_ref().and_then(|b| b.value.stmts.last()) {
                Some(Node { value: ast::Stmt::Expr(expr), .. }) => expr.clone(),
                other => panic!("Expected expression statement, got {:?}", other),
            },
            other => panic!("Expected sample function, got {:?}", other),
        };
        let generated = generate_symbols(program, "main.spp", &mut MemoryLoader::new(), &mut sources)?;
        infer_expression(&generated.scopes, &expr, generated.scopes.global())
    }

    fn inferred(expr: &str) -> String {
        infer_in_context(expr).unwrap().to_string()
    }

    #[test]
    fn test_literals() {
        assert_eq!(inferred("(1, \"a\", true)"), "(Num, Str, Bool)");
        assert_eq!(inferred("[1, 2]"), "Arr[Num]");
        assert_eq!(infer_in_context("[]").unwrap_err().kind, SemanticErrorKind::EmptyArray);
    }

    #[test]
    fn test_operators_and_calls() {
        assert_eq!(inferred("1 + 2 * 3"), "Num");
        assert_eq!(inferred("1 < 2"), "Bool");
        assert_eq!(inferred("f(\"a\")"), "Str");
        assert_eq!(inferred("f(1)"), "Num");
    }

    #[test]
    fn test_members_and_statics() {
        assert_eq!(inferred("Point{x: 1, y: 2}.x"), "Num");
        assert_eq!(inferred("Color.Green"), "Color");
        assert_eq!(inferred("Box{value: \"s\"}"), "Box[Str]");
        assert_eq!(inferred("Box{value: \"s\"}.value"), "Str");
        let error = infer_in_context("Point{x: 1, y: 2}.z").unwrap_err();
        assert!(matches!(error.kind, SemanticErrorKind::UnknownAttribute { .. }));
    }

    #[test]
    fn test_tuple_index() {
        assert_eq!(inferred("(1, \"a\").1"), "Str");
        assert!(matches!(
            infer_in_context("(1, \"a\").2").unwrap_err().kind,
            SemanticErrorKind::TupleIndexOutOfRange { index: 2, .. }
        ));
        assert_eq!(
            infer_in_context("Point{x: 1, y: 2}.0").unwrap_err().kind,
            SemanticErrorKind::NotATuple("Point".into())
        );
    }

    #[test]
    fn test_block_bindings_stay_in_overlay() {
        assert_eq!(inferred("({ let (a, b) = (1, \"s\"); b })"), "Str");
        let error = infer_in_context("({ let x = 1; x }, x)").unwrap_err();
        assert_eq!(error.kind, SemanticErrorKind::UnknownIdentifier("x".into()));
    }

    #[test]
    fn test_lambda_return_from_body() {
        assert_eq!(inferred("|a: Num| a * 2"), "|Num| -> Num");
        assert_eq!(inferred("(|a: Num| a * 2)(3)"), "Num");
    }

    #[test]
    fn test_if_branches() {
        assert_eq!(inferred("if true { 1 } else { 2 }"), "Num");
        assert_eq!(infer_in_context("if true { 1 }").unwrap_err().kind, SemanticErrorKind::IfMissingElse);
        assert!(matches!(
            infer_in_context("if true { 1 } else { \"a\" }").unwrap_err().kind,
            SemanticErrorKind::BranchTypeMismatch { .. }
        ));
    }
}
