//! # SPP Semantic Analysis
//!
//! Symbol generation, type inference and semantic checking for SPP modules.
//!
//! Analysis runs in two passes over a parsed [`spp_ast::Program`]:
//!
//! 1. [`SymbolGenerator`] builds the scope arena for the prelude, every
//!    imported module and the program itself.
//! 2. [`Analyser`] walks each generated unit in lockstep with that arena,
//!    checking types, overloads, declarations, moves and borrows.
//!
//! The first error stops analysis and is returned as a [`SemanticError`].

mod error;
mod types;
mod symbols;
mod overloads;
mod scope;
mod resolve;
mod suggest;
mod unify;
mod call;
mod infer;
mod builtins;
mod loader;
mod symbol_gen;
mod checker;
mod decl_checker;
mod stmt_checker;
mod expr_checker;
mod borrow;
mod diagnostics;
mod dump;

// Re-export public API
pub use error::{ErrorCategory, SemaResult, SemanticError, SemanticErrorKind};
pub use types::{FunctionRef, Type};
pub use symbols::{
    FunctionFlags, FunctionId, FunctionSymbol, MemoryStatus, ScopeId, TagSymbol, TypeId, TypeSymbol,
    TypeSymbolKind, VarType, VariableKind, VariableSymbol,
};
pub use overloads::{OverloadGroup, OverloadRegistry};
pub use scope::{Scope, ScopeHandler, ScopeKind, SupInfo};
pub use suggest::{closest, similarity};
pub use unify::{types_equal_account_for_generic, Bindings};
pub use call::{CallArg, ResolvedCall};
pub use infer::{infer_expression, Inferrer};
pub use builtins::{PRELUDE, PRELUDE_NAME};
pub use loader::{LoadError, LoadedModule, MemoryLoader, ModuleLoader};
pub use symbol_gen::{Generated, SymbolGenerator, Unit};
pub use checker::Analyser;
pub use borrow::{place_of, Place};
pub use diagnostics::{render_plain, SourceFile, SourceMap};
pub use dump::{dump_arena, to_json, ArenaDump};

use spp_ast::Program;

// =============================================================================
// Public API
// =============================================================================

/// Result of a successful analysis
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeHandler,
    pub units: Vec<Unit>,
    /// Declaration scopes in the order the analyser entered them
    pub traversal: Vec<ScopeId>,
}

/// Generates symbols for `program` and its imports, then analyses every unit.
pub fn analyse(
    program: Program,
    name: &str,
    loader: &mut dyn ModuleLoader,
    sources: &mut SourceMap,
) -> SemaResult<Analysis> {
    let generated = SymbolGenerator::new(loader, sources).generate(program, name)?;
    let mut scopes = generated.scopes;
    let traversal = {
        let mut analyser = Analyser::new(&mut scopes);
        analyser.analyse_units(&generated.units)?;
        analyser.into_traversal()
    };
    Ok(Analysis { scopes, units: generated.units, traversal })
}

/// Symbol generation only, for inspecting the scope arena.
pub fn generate_symbols(
    program: Program,
    name: &str,
    loader: &mut dyn ModuleLoader,
    sources: &mut SourceMap,
) -> SemaResult<Generated> {
    SymbolGenerator::new(loader, sources).generate(program, name)
}

impl Analysis {
    /// Clears every visited flag and analyses all units again, returning
    /// the new traversal order.
    pub fn reanalyse(&mut self) -> SemaResult<Vec<ScopeId>> {
        self.scopes.reset_visited();
        let mut analyser = Analyser::new(&mut self.scopes);
        analyser.analyse_units(&self.units)?;
        Ok(analyser.into_traversal())
    }
}

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::testing::{check, check_err, check_with};
    use super::*;
    use spp_ast::Span;

    const DATA: &str = "
        cls Data { n: Num; }
        cls Pair { a: Data; b: Data; }
        fn take(d: Data) {}
        fn both(a: &mut Data, b: &mut Data) {}
        fn mixed(a: &mut Data, b: Data) {}
        fn read(a: &Data, b: &Data) {}
    ";

    fn with_data(body: &str) -> String {
        format!("{}\nfn main() {{ {} }}", DATA, body)
    }

    // -------------------------------------------------------------------------
    // Scope lookup monotonicity
    // -------------------------------------------------------------------------

    #[test]
    fn test_outer_bindings_stay_visible_in_nested_blocks() {
        let analysis = check(
            "fn main() {
                let total = 1;
                {
                    let inner = total;
                    while true as outer {
                        let deeper = inner + total;
                        exit outer;
                    }
                }
            }",
        )
        .unwrap();

        let scopes = &analysis.scopes;
        for scope in scopes.scopes() {
            let mut ancestor = scope.parent;
            while let Some(id) = ancestor {
                for name in scopes.scope(id).variables.keys() {
                    assert!(
                        scopes.get_variable(scope.id, name).is_some(),
                        "'{}' from '{}' not visible in '{}'",
                        name,
                        scopes.scope(id).name,
                        scope.name
                    );
                }
                ancestor = scopes.scope(id).parent;
            }
        }
    }

    #[test]
    fn test_inner_bindings_are_not_visible_outside() {
        let kind = check_err("fn main() { { let hidden = 1; } let x = hidden; }");
        assert_eq!(kind, SemanticErrorKind::UnknownIdentifier("hidden".into()));
    }

    // -------------------------------------------------------------------------
    // Move exclusivity
    // -------------------------------------------------------------------------

    #[test]
    fn test_two_mutable_borrows_of_one_place_conflict() {
        let kind = check_err(&with_data("let mut d = Data{n: 1}; both(&mut d, &mut d);"));
        assert!(matches!(kind, SemanticErrorKind::BorrowConflict { ref path, kind: "mutable", .. } if path == "d"));
    }

    #[test]
    fn test_shared_borrows_coexist() {
        check(&with_data("let d = Data{n: 1}; read(&d, &d);")).unwrap();
    }

    #[test]
    fn test_disjoint_fields_may_be_borrowed_mutably() {
        check(&with_data("let mut p = Pair{a: Data{n: 1}, b: Data{n: 2}}; both(&mut p.a, &mut p.b);")).unwrap();
    }

    #[test]
    fn test_field_overlapping_its_parent_conflicts() {
        let kind = check_err(&with_data(
            "let mut p = Pair{a: Data{n: 1}, b: Data{n: 2}}; read(&p, &p.a); mixed(&mut p.a, p.a);",
        ));
        assert!(matches!(kind, SemanticErrorKind::MoveWhileBorrowed(ref path) if path == "p.a"));
    }

    #[test]
    fn test_use_after_move() {
        let kind = check_err(&with_data("let d = Data{n: 1}; take(d); take(d);"));
        assert_eq!(kind, SemanticErrorKind::UseOfMovedValue("d".into()));
    }

    #[test]
    fn test_copy_values_are_not_moved() {
        check("fn twice(n: Num) -> Num { ret n + n; } fn main() { let n = 1; twice(n); twice(n); }").unwrap();
    }

    #[test]
    fn test_move_after_mutable_borrow_in_same_call() {
        let kind = check_err(&with_data("let mut d = Data{n: 1}; mixed(&mut d, d);"));
        assert_eq!(kind, SemanticErrorKind::MoveWhileBorrowed("d".into()));
    }

    #[test]
    fn test_moving_a_borrowed_parameter() {
        let kind = check_err(&format!("{}\nfn keep(d: &Data) {{ take(d); }}", DATA));
        assert_eq!(kind, SemanticErrorKind::MoveWhileBorrowed("d".into()));
    }

    fn with_holder(method: &str) -> String {
        format!("{}\ncls Holder {{ d: Data; }}\nfn touch(a: &mut Data) {{}}\nsup Holder {{ {} }}", DATA, method)
    }

    #[test]
    fn test_arguments_rooted_at_self_follow_the_receiver_convention() {
        let kind = check_err(&with_holder("fn f(&self) { touch(&mut self.d); }"));
        assert_eq!(kind, SemanticErrorKind::MutBorrowOfImmutable("self.d".into()));

        let kind = check_err(&with_holder("fn f(&self) { take(self.d); }"));
        assert_eq!(kind, SemanticErrorKind::MoveWhileBorrowed("self.d".into()));

        let kind = check_err(&with_holder("fn f(&mut self) { both(&mut self.d, &mut self.d); }"));
        assert!(matches!(kind, SemanticErrorKind::BorrowConflict { ref path, .. } if path == "self.d"));

        check(&with_holder("fn f(&mut self) { touch(&mut self.d); read(&self.d, &self.d); }")).unwrap();
        check(&with_holder("fn f(self) { take(self.d); }")).unwrap();
    }

    #[test]
    fn test_if_branches_start_from_the_same_state() {
        check(&with_data("let c = true; let d = Data{n: 1}; if c { take(d); } else { take(d); }")).unwrap();
        check(&with_data("let c = true; let d = Data{n: 1}; if c { take(d); } else if !c { take(d); } else {}")).unwrap();
    }

    #[test]
    fn test_move_in_either_branch_persists_after_the_if() {
        let kind = check_err(&with_data("let c = true; let d = Data{n: 1}; if c { take(d); } else {} take(d);"));
        assert_eq!(kind, SemanticErrorKind::UseOfMovedValue("d".into()));

        let kind = check_err(&with_data("let c = true; let d = Data{n: 1}; if c {} else { take(d); } take(d);"));
        assert_eq!(kind, SemanticErrorKind::UseOfMovedValue("d".into()));

        let kind = check_err(&with_data("let c = true; let d = Data{n: 1}; if c { take(d); } take(d);"));
        assert_eq!(kind, SemanticErrorKind::UseOfMovedValue("d".into()));
    }

    #[test]
    fn test_mutable_borrow_needs_mutable_binding() {
        let kind = check_err(&with_data("let d = Data{n: 1}; let e = Data{n: 2}; both(&mut d, &mut e);"));
        assert_eq!(kind, SemanticErrorKind::MutBorrowOfImmutable("d".into()));
    }

    #[test]
    fn test_reassignment_reinitialises_a_moved_value() {
        check(&with_data("let mut d = Data{n: 1}; take(d); d = Data{n: 2}; take(d);")).unwrap();
    }

    #[test]
    fn test_use_of_uninitialised_value() {
        let kind = check_err("fn main() { let x: Num; let y = x; }");
        assert_eq!(kind, SemanticErrorKind::UseOfUninitialised("x".into()));
    }

    // -------------------------------------------------------------------------
    // Generic binding determinism
    // -------------------------------------------------------------------------

    const SAME: &str = "fn same[T](a: T, b: T) -> T { ret a; }";

    #[test]
    fn test_generic_binds_from_arguments() {
        check(&format!("{}\nfn main() {{ let s: Str = same(\"x\", \"y\"); }}", SAME)).unwrap();
    }

    #[test]
    fn test_generic_rebind_is_rejected() {
        let kind = check_err(&format!("{}\nfn main() {{ same(\"x\", 1); }}", SAME));
        match kind {
            SemanticErrorKind::GenericRebind { name, bound, found } => {
                assert_eq!(name, "T");
                assert_eq!(bound, "Str");
                assert_eq!(found, "Num");
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_explicit_generic_arguments() {
        check(&format!("{}\nfn main() {{ let s: Str = same[Str](\"x\", \"y\"); }}", SAME)).unwrap();
        let kind = check_err(&format!("{}\nfn main() {{ same[Num](\"x\", \"y\"); }}", SAME));
        assert!(matches!(kind, SemanticErrorKind::GenericRebind { ref bound, ref found, .. } if bound == "Num" && found == "Str"));
    }

    #[test]
    fn test_class_generics_inferred_from_fields() {
        check(
            "cls Box[T] { value: T; }
             fn main() { let b = Box{value: 1}; let n: Num = b.value; }",
        )
        .unwrap();
        let kind = check_err("cls Box[T] { value: T; } fn main() { let b = Box{value: 1}; let s: Str = b.value; }");
        assert!(matches!(kind, SemanticErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_method_generic_from_receiver() {
        check("fn main() { let items = [1, 2]; let first: Num = items.get(0); }").unwrap();
    }

    // -------------------------------------------------------------------------
    // Idempotent re-traversal
    // -------------------------------------------------------------------------

    #[test]
    fn test_reanalysis_visits_the_same_scopes() {
        let mut analysis = check(
            "cls Point { x: Num; y: Num; }
             sup Point {
                 fn sum(&self) -> Num { ret self.x + self.y; }
                 @meta.static_method fn origin() -> Point { ret Point{x: 0, y: 0}; }
             }
             enum Color { Red, Green }
             fn main() { let p = Point.origin(); let s = p.sum(); let c = Color.Red; }",
        )
        .unwrap();
        let first = analysis.traversal.clone();
        assert!(!first.is_empty());
        let second = analysis.reanalyse().unwrap();
        assert_eq!(first, second);
    }

    // -------------------------------------------------------------------------
    // Overload selection
    // -------------------------------------------------------------------------

    const OVERLOADS: &str = "fn f(x: Num) -> Num { ret x; }\nfn f(x: Str) -> Str { ret x; }";

    #[test]
    fn test_overload_selected_by_argument_type() {
        check(&format!("{}\nfn main() {{ let s: Str = f(\"a\"); let n: Num = f(1); }}", OVERLOADS)).unwrap();
    }

    #[test]
    fn test_no_matching_overload_lists_candidates() {
        let kind = check_err(&format!("{}\nfn main() {{ f(true); }}", OVERLOADS));
        match &kind {
            SemanticErrorKind::NoMatchingOverload { name, args, candidates } => {
                assert_eq!(name, "f");
                assert_eq!(args, "Bool");
                assert!(candidates.contains("fn f(x: Num) -> Num"));
                assert!(candidates.contains("fn f(x: Str) -> Str"));
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_generic_candidate_wins_a_tie() {
        check(
            "fn show(x: Num) -> Str { ret \"n\"; }
             fn show[T](x: T) -> Num { ret 1; }
             fn main() { let s: Str = show(1); let n: Num = show(\"a\"); }",
        )
        .unwrap();
    }

    #[test]
    fn test_override_is_closer_than_base_method() {
        let analysis = check(
            "cls Shape {}
             sup Shape { @meta.virtual_method fn area(&self) -> Num { ret 0; } }
             cls Square { side: Num; }
             sup Shape for Square { fn area(&self) -> Num { ret self.side * self.side; } }
             fn main() { let s = Square{side: 2}; let a: Num = s.area(); }",
        )
        .unwrap();

        let scopes = &analysis.scopes;
        let span = Span::default();
        let square = scopes.get_type(scopes.global(), "Square").unwrap();
        let receiver = scopes.instantiate(square, vec![], true, span).unwrap();
        let method = scopes.member_type(&receiver, "area", span).unwrap();
        let resolved = scopes.resolve_call(&method, &[], &[], span).unwrap();
        let chosen = scopes.function(resolved.function.unwrap());
        match &scopes.scope(chosen.owner).kind {
            ScopeKind::Sup(info) => assert_eq!(info.target, square),
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_argument_count_mismatch() {
        let kind = check_err("fn g(a: Num) {} fn main() { g(1, 2); }");
        assert_eq!(kind, SemanticErrorKind::ArgumentCount { name: "g".into(), expected: 1, found: 2 });
    }

    // -------------------------------------------------------------------------
    // Struct initializer completeness
    // -------------------------------------------------------------------------

    #[test]
    fn test_missing_and_unknown_fields() {
        let kind = check_err("cls P { a: Num; b: Num; } fn main() { let p = P{a: 1}; }");
        assert_eq!(kind.to_string(), "missing fields: b");

        let kind = check_err("cls P { a: Num; b: Num; } fn main() { let p = P{a: 1, b: 2, c: 3}; }");
        assert_eq!(kind.to_string(), "unknown fields: c");

        let kind = check_err("cls P { a: Num; b: Num; } fn main() { let p = P{a: 1, a: 2, b: 3}; }");
        assert_eq!(kind.to_string(), "duplicate fields: a");
    }

    #[test]
    fn test_default_object_fills_missing_fields() {
        check(
            "cls P { a: Num; b: Num; }
             fn main() { let base = P{a: 1, b: 2}; let p = P{a: 5, else: base}; let a = 3; let q = P{a, b: 4}; }",
        )
        .unwrap();
    }

    // -------------------------------------------------------------------------
    // Typedef aliasing
    // -------------------------------------------------------------------------

    #[test]
    fn test_typedef_aliases_are_transitive() {
        let analysis = check(
            "cls Point { x: Num; }
             use Point as P1;
             use P1 as P2;
             fn main() { let a: P2 = Point{x: 1}; let b: Point = P2{x: 2}; let c: P1 = a; }",
        )
        .unwrap();
        let scopes = &analysis.scopes;
        let global = scopes.global();
        let span = Span::default();
        let point = scopes.instantiate(scopes.get_type(global, "Point").unwrap(), vec![], true, span).unwrap();
        let p2 = scopes.instantiate(scopes.get_type(global, "P2").unwrap(), vec![], true, span).unwrap();
        assert_eq!(point, p2);
    }

    #[test]
    fn test_typedef_inside_a_function() {
        check("fn main() { use Num as Count; let c: Count = 1; let n: Num = c; }").unwrap();
    }

    // -------------------------------------------------------------------------
    // Self-referential classes
    // -------------------------------------------------------------------------

    #[test]
    fn test_self_referential_class() {
        let analysis = check(
            "cls Tree { value: Num; children: Arr[Tree]; }
             sup Tree { fn first(&self) -> Tree { ret self.children.get(0); } }",
        )
        .unwrap();
        let scopes = &analysis.scopes;
        let tree = scopes.get_type(scopes.global(), "Tree").unwrap();
        let class_scope = scopes.type_symbol(tree).scope.unwrap();
        let children = scopes.get_variable_exclusive(class_scope, "children").unwrap();
        let ty = scopes.variable_type(children).unwrap();
        assert_eq!(ty.generics()[0].id(), Some(tree));
        assert_eq!(ty.to_string(), "Arr[Tree]");
    }

    // -------------------------------------------------------------------------
    // Declarations and decorators
    // -------------------------------------------------------------------------

    #[test]
    fn test_decorator_rules() {
        let kind = check_err("@meta.inline fn f() {}");
        assert_eq!(kind, SemanticErrorKind::UnknownDecorator("meta.inline".into()));

        let kind = check_err("@meta.virtual_method fn f() {}");
        assert!(matches!(kind, SemanticErrorKind::InvalidDecorator { .. }));

        let kind = check_err("cls A {} sup A { @meta.static_method fn f(&self) {} }");
        assert!(matches!(kind, SemanticErrorKind::InvalidDecorator { .. }));

        let kind = check_err("cls A {} sup A { @meta.abstract_method @meta.static_method fn f(); }");
        assert!(matches!(kind, SemanticErrorKind::InvalidDecorator { ref decorator, .. } if decorator == "meta.static_method"));

        check("@inline fn f() {}").unwrap();
    }

    #[test]
    fn test_body_rules() {
        let kind = check_err("cls A {} sup A { @meta.abstract_method fn f(&self) {} }");
        assert_eq!(kind, SemanticErrorKind::AbstractWithBody("f".into()));

        let kind = check_err("fn f();");
        assert_eq!(kind, SemanticErrorKind::MissingBody("f".into()));

        let kind = check_err("fn f(c: Bool) -> Num { if c { ret 1; } }");
        assert!(matches!(kind, SemanticErrorKind::MissingReturn { ref name, ref ty } if name == "f" && ty == "Num"));

        check("fn f(c: Bool) -> Num { if c { ret 1; } else { ret 2; } }").unwrap();
        check("fn count() -> Gen[Num] { gen 1; gen 2; }").unwrap();
    }

    #[test]
    fn test_uninferable_generic() {
        let kind = check_err("fn make[T]() -> Num { ret 1; }");
        assert_eq!(kind, SemanticErrorKind::UninferableGeneric("T".into()));
    }

    #[test]
    fn test_void_attribute_is_rejected() {
        assert_eq!(check_err("cls A { nothing: Void; }"), SemanticErrorKind::VoidBinding);
    }

    #[test]
    fn test_override_rules() {
        let kind = check_err(
            "cls Base {} sup Base { fn f(&self) {} }
             cls Child {} sup Base for Child { fn f(&self) {} }",
        );
        assert!(matches!(kind, SemanticErrorKind::InvalidOverride { ref method, ref base, .. } if method == "f" && base == "Base"));

        let kind = check_err(
            "cls Base {} sup Base { @meta.abstract_method fn f(&self); }
             cls Child {} sup Base for Child { fn g(&self) {} }",
        );
        assert!(matches!(kind, SemanticErrorKind::InvalidOverride { ref method, .. } if method == "g"));
    }

    // -------------------------------------------------------------------------
    // Statements and expressions
    // -------------------------------------------------------------------------

    #[test]
    fn test_let_rules() {
        assert_eq!(check_err("fn nothing() {} fn main() { let x = nothing(); }"), SemanticErrorKind::VoidBinding);
        assert_eq!(check_err("fn main() { let (a, b) = 1; }"), SemanticErrorKind::NotATuple("Num".into()));
        assert_eq!(
            check_err("fn main() { let (a, b) = (1, 2, 3); }"),
            SemanticErrorKind::TupleArity { expected: 3, found: 2 }
        );
        assert_eq!(check_err("fn main() { let x; }"), SemanticErrorKind::MissingTypeAnnotation("x".into()));
        assert!(matches!(check_err("fn main() { let x: Str = 1; }"), SemanticErrorKind::TypeMismatch { .. }));
        check("fn main() { let (a, mut b) = (1, \"s\"); b = \"t\"; let t = (a, b); let s: Str = t.1; }").unwrap();
    }

    #[test]
    fn test_assignment_rules() {
        assert_eq!(check_err("fn main() { let x = 1; x = 2; }"), SemanticErrorKind::AssignToImmutable("x".into()));
        assert_eq!(
            check_err("fn main() { let x: Num; x = 1; x = 2; }"),
            SemanticErrorKind::AssignToImmutable("x".into())
        );
        assert_eq!(check_err("fn main() { 1 = 2; }"), SemanticErrorKind::InvalidAssignTarget);
        check("fn main() { let x: Num; x = 1; let mut y = 2; y += x; y *= 3; }").unwrap();
        check("cls C { n: Num; } sup C { fn bump(&mut self) { self.n += 1; } }").unwrap();
        let kind = check_err("cls C { n: Num; } sup C { fn bump(&self) { self.n = 1; } }");
        assert_eq!(kind, SemanticErrorKind::AssignToImmutable("self.n".into()));
    }

    #[test]
    fn test_if_expression_rules() {
        check("fn main() { let x = if true { 1 } else { 2 }; let y: Num = x; }").unwrap();
        assert_eq!(check_err("fn main() { let x = if true { 1 }; }"), SemanticErrorKind::IfMissingElse);
        assert!(matches!(
            check_err("fn main() { let x = if true { 1 } else { \"a\" }; }"),
            SemanticErrorKind::BranchTypeMismatch { .. }
        ));
        assert!(matches!(check_err("fn main() { if 1 { } }"), SemanticErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_loop_control() {
        check("fn main() { while true as outer { while false { exit outer; } skip; } }").unwrap();
        assert_eq!(check_err("fn main() { exit; }"), SemanticErrorKind::OutsideLoop("exit"));
        assert_eq!(
            check_err("fn main() { while true { skip inner; } }"),
            SemanticErrorKind::UnknownTag("inner".into())
        );
        assert_eq!(
            check_err("fn main() { while true { let f = |x: Num| { exit; }; } }"),
            SemanticErrorKind::OutsideLoop("exit")
        );
    }

    #[test]
    fn test_with_needs_a_context_manager() {
        check(
            "cls Lock { held: Bool; }
             sup Lock { fn enter(&self) -> Num { ret 1; } fn leave(&self) {} }
             fn main() { let l = Lock{held: false}; with l as v { let n: Num = v; } }",
        )
        .unwrap();
        let kind = check_err("fn main() { with 1 as v { } }");
        assert!(matches!(kind, SemanticErrorKind::NotAContextManager(ref t) if t == "Num"));
    }

    #[test]
    fn test_generator_rules() {
        let kind = check_err("fn f() -> Num { gen 1; ret 1; }");
        assert!(matches!(kind, SemanticErrorKind::InvalidYield(_)));
        let kind = check_err("fn f() -> Gen[Num] { gen \"a\"; }");
        assert!(matches!(kind, SemanticErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_return_type_checked() {
        let kind = check_err("fn f() -> Num { ret \"a\"; }");
        assert!(matches!(kind, SemanticErrorKind::TypeMismatch { ref expected, ref found } if expected == "Num" && found == "Str"));
    }

    #[test]
    fn test_lambdas() {
        check("fn main() { let add = |a: Num, b: Num| a + b; let n: Num = add(1, 2); }").unwrap();
        check("fn main() { let neg = |a: Num| -> Num { ret -a; }; let n: Num = neg(1); }").unwrap();
        let kind = check_err("fn main() { let add = |a: Num| a; add(\"s\"); }");
        assert!(matches!(kind, SemanticErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_arrays() {
        check("fn main() { let mut a = [1, 2, 3]; a.push(4); let n: Num = a.len(); }").unwrap();
        assert!(matches!(check_err("fn main() { let a = [1, \"x\"]; }"), SemanticErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_placeholder_is_unsupported() {
        let kind = check_err("fn main() { let x = _; }");
        assert!(matches!(kind, SemanticErrorKind::Unsupported(_)));
        assert_eq!(kind.category(), ErrorCategory::Internal);
    }

    // -------------------------------------------------------------------------
    // Lookup failures and suggestions
    // -------------------------------------------------------------------------

    #[test]
    fn test_unknown_identifier_suggests_similar_name() {
        let error = check("fn main() { let counter = 1; let y = countr; }").unwrap_err();
        assert_eq!(error.kind, SemanticErrorKind::UnknownIdentifier("countr".into()));
        assert_eq!(error.help.as_deref(), Some("did you mean 'counter'?"));
    }

    #[test]
    fn test_unknown_attribute_suggests_member() {
        let error = check("cls P { name: Str; } fn main() { let p = P{name: \"a\"}; let n = p.nmae; }").unwrap_err();
        assert!(matches!(error.kind, SemanticErrorKind::UnknownAttribute { ref attribute, .. } if attribute == "nmae"));
        assert_eq!(error.help.as_deref(), Some("did you mean 'name'?"));
    }

    #[test]
    fn test_unknown_type_suggests_similar_type() {
        let error = check("fn f(x: Nmu) {}").unwrap_err();
        assert_eq!(error.kind, SemanticErrorKind::UnknownType("Nmu".into()));
        assert_eq!(error.help.as_deref(), Some("did you mean 'Num'?"));
    }

    // -------------------------------------------------------------------------
    // Modules
    // -------------------------------------------------------------------------

    #[test]
    fn test_imported_class_is_usable() {
        let mut loader = MemoryLoader::new().with_module(
            "geo.shapes",
            "cls Circle { r: Num; }\nsup Circle { fn area(&self) -> Num { ret self.r * self.r * 3; } }",
        );
        check_with(
            "use geo.shapes.Circle;\nfn main() { let c = Circle{r: 2}; let a: Num = c.area(); let d: geo.shapes.Circle = c; }",
            &mut loader,
        )
        .unwrap();
    }

    #[test]
    fn test_qualified_prelude_type() {
        check("fn main() { let n: std.Num = 1; }").unwrap();
    }

    #[test]
    fn test_errors_in_imported_module_are_reported() {
        let mut loader = MemoryLoader::new().with_module("util", "fn broken() -> Num { ret \"s\"; }");
        let kind = check_with("use util;", &mut loader).unwrap_err().kind;
        assert!(matches!(kind, SemanticErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn test_scope_dump_is_json() {
        let analysis = check("cls A { x: Num; } fn f(a: A) {}").unwrap();
        let json = to_json(&analysis.scopes).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["scopes"].as_array().unwrap().len() > 2);
        assert!(json.contains("\"fn f(a: A)\""));

        let variables = value["scopes"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|scope| scope["variables"].as_array().unwrap().iter());
        let function = variables
            .clone()
            .find(|var| var["name"] == "f")
            .expect("function variable in the dump");
        assert_eq!(function["comptime"], true);
        let attribute = variables.clone().find(|var| var["name"] == "x").expect("attribute in the dump");
        assert!(attribute.get("comptime").is_none());
    }
}
