//! Symbol generation: builds the scope arena from module ASTs
//!
//! Generation runs before any analysis. It loads the prelude, follows
//! imports through a [`ModuleLoader`], and records every generated module
//! as an analysis [`Unit`] in dependency order: the prelude first, then
//! imported modules, then the program itself.

use std::collections::HashMap;

use spp_ast::{self as ast, Node, Span};
use spp_parser::ParseError;

use crate::builtins::{PRELUDE, PRELUDE_NAME, PRELUDE_TYPES};
use crate::diagnostics::SourceMap;
use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::loader::ModuleLoader;
use crate::resolve::STD;
use crate::scope::{ScopeHandler, ScopeKind, SupInfo};
use crate::symbols::{
    FunctionFlags, FunctionSymbol, ScopeId, TypeId, TypeSymbol, TypeSymbolKind, VarType,
    VariableKind, VariableSymbol,
};
use crate::types::Type;

/// A generated module waiting for analysis
#[derive(Debug, Clone)]
pub struct Unit {
    pub name: String,
    /// Scope the module's members were generated into
    pub scope: ScopeId,
    pub program: ast::Program,
}

/// Output of symbol generation
#[derive(Debug)]
pub struct Generated {
    pub scopes: ScopeHandler,
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModuleState {
    InProgress,
    Done,
}

pub struct SymbolGenerator<'a> {
    scopes: ScopeHandler,
    loader: &'a mut dyn ModuleLoader,
    sources: &'a mut SourceMap,
    modules: HashMap<Vec<String>, ModuleState>,
    units: Vec<Unit>,
    sup_counter: usize,
}

impl<'a> SymbolGenerator<'a> {
    pub fn new(loader: &'a mut dyn ModuleLoader, sources: &'a mut SourceMap) -> Self {
        Self {
            scopes: ScopeHandler::new(),
            loader,
            sources,
            modules: HashMap::new(),
            units: Vec::new(),
            sup_counter: 0,
        }
    }

    /// Generates the prelude, every import reachable from `program`, and
    /// `program` itself into the global scope.
    pub fn generate(mut self, program: ast::Program, name: &str) -> SemaResult<Generated> {
        let _span = tracing::info_span!("symbol_gen", unit = name).entered();

        self.generate_prelude()?;
        let global = self.scopes.global();
        self.generate_unit(program, name, global)?;

        tracing::debug!(
            units = self.units.len(),
            scopes = self.scopes.scopes().len(),
            "symbol generation complete"
        );
        Ok(Generated { scopes: self.scopes, units: self.units })
    }

    // =========================================================================
    // Units and modules
    // =========================================================================

    fn generate_prelude(&mut self) -> SemaResult<()> {
        let file_id = self.sources.add(PRELUDE_NAME, PRELUDE);
        let program = spp_parser::parse_source(PRELUDE, file_id)
            .map_err(|errors| import_syntax(STD, &errors))?;

        let path = vec![STD.to_string()];
        self.modules.insert(path.clone(), ModuleState::InProgress);
        let scope = self.namespace_scope(&path);
        self.generate_unit(program, PRELUDE_NAME, scope)?;
        self.modules.insert(path, ModuleState::Done);

        let global = self.scopes.global();
        for name in PRELUDE_TYPES {
            if let Some(id) = self.scopes.get_type_exclusive(scope, name) {
                self.scopes.add_type_alias(global, name, id, Span::default())?;
            }
        }
        Ok(())
    }

    fn generate_unit(&mut self, program: ast::Program, name: &str, scope: ScopeId) -> SemaResult<()> {
        for import in &program.imports {
            self.generate_import(import, scope)?;
        }

        self.scopes.enter(scope);
        for member in &program.members {
            self.generate_member(member)?;
        }

        self.units.push(Unit { name: name.to_string(), scope, program });
        Ok(())
    }

    /// Creates or reuses the namespace scopes `global -> a -> b` for `a.b`.
    fn namespace_scope(&mut self, path: &[String]) -> ScopeId {
        let mut cursor = self.scopes.global();
        for segment in path {
            let existing = self.scopes.scope(cursor).children.iter().copied().find(|c| {
                let child = self.scopes.scope(*c);
                child.name == *segment && matches!(child.kind, ScopeKind::Module(_))
            });
            cursor = match existing {
                Some(found) => found,
                None => {
                    self.scopes.enter(cursor);
                    self.scopes.into_new_scope(segment.clone(), ScopeKind::Module(segment.clone()))
                }
            };
        }
        cursor
    }

    fn generate_import(&mut self, import: &Node<ast::ImportDecl>, importer: ScopeId) -> SemaResult<()> {
        let path = import.value.module_path();
        let module_scope = match self.modules.get(&path).copied() {
            Some(ModuleState::Done) => self.namespace_scope(&path),
            Some(ModuleState::InProgress) => {
                tracing::debug!(module = %path.join("."), "cyclic import, module already in progress");
                self.namespace_scope(&path)
            }
            None => self.load_module(&path, import.span)?,
        };

        for name in &import.value.names {
            let id = self
                .scopes
                .get_type_exclusive(module_scope, &name.value.name)
                .ok_or_else(|| {
                    SemanticError::new(
                        SemanticErrorKind::UnknownType(format!("{}.{}", path.join("."), name.value.name)),
                        name.span,
                    )
                })?;
            self.scopes.add_type_alias(importer, &name.value.name, id, name.span)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, span), fields(module = %path.join(".")))]
    fn load_module(&mut self, path: &[String], span: Span) -> SemaResult<ScopeId> {
        let module = path.join(".");
        let loaded = self.loader.load(path).map_err(|error| {
            SemanticError::new(SemanticErrorKind::ModuleNotFound(module.clone(), error.to_string()), span)
        })?;

        let file_id = self.sources.add(loaded.name.clone(), loaded.source.clone());
        let program = spp_parser::parse_source(&loaded.source, file_id)
            .map_err(|errors| import_syntax(&module, &errors))?;

        self.modules.insert(path.to_vec(), ModuleState::InProgress);
        let saved = self.scopes.current();
        let scope = self.namespace_scope(path);
        self.generate_unit(program, &loaded.name, scope)?;
        self.scopes.enter(saved);
        self.modules.insert(path.to_vec(), ModuleState::Done);

        tracing::debug!(file = %loaded.name, "module generated");
        Ok(scope)
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn generate_member(&mut self, member: &Node<ast::ModuleMember>) -> SemaResult<()> {
        match &member.value {
            ast::ModuleMember::Function(decl) => self.generate_function(decl),
            ast::ModuleMember::Class(decl) => self.generate_class(decl),
            ast::ModuleMember::Enum(decl) => self.generate_enum(decl),
            ast::ModuleMember::Sup(decl) => self.generate_sup(decl),
            ast::ModuleMember::Typedef(decl) => {
                let here = self.scopes.current();
                self.scopes.add_typedef(here, decl).map(|_| ())
            }
        }
    }

    fn generate_function(&mut self, decl: &ast::FunctionDecl) -> SemaResult<()> {
        let owner = self.scopes.current();
        let id = self.scopes.next_function_id();
        let scope = self.scopes.into_new_scope(decl.name.value.name.clone(), ScopeKind::Function(id));
        self.declare_generics(scope, &decl.generics)?;
        self.scopes.exit_cur_scope();

        self.scopes.add_function(FunctionSymbol {
            name: decl.name.value.name.clone(),
            generics: decl.generics.clone(),
            params: decl.params.clone(),
            return_type: decl.return_type.clone(),
            decorators: decl.decorators.clone(),
            has_body: decl.body.is_some(),
            scope,
            owner,
            flags: FunctionFlags::default(),
            span: decl.name.span,
        })?;
        Ok(())
    }

    fn generate_class(&mut self, decl: &ast::ClassDecl) -> SemaResult<()> {
        let here = self.scopes.current();
        let name = decl.name.value.name.clone();
        let generics: Vec<String> = decl.generics.iter().map(|g| g.value.name.name.clone()).collect();

        // Declared before the class scope exists so attributes may name the class itself.
        let id = self.scopes.add_type(
            here,
            TypeSymbol {
                name: name.clone(),
                kind: TypeSymbolKind::Class { generics },
                scope: None,
                bases: Vec::new(),
                span: decl.name.span,
            },
        )?;
        let class_scope = self.scopes.into_new_scope(name.clone(), ScopeKind::Class(id));
        self.scopes.type_symbol_mut(id).scope = Some(class_scope);

        let placeholders = self.declare_generics(class_scope, &decl.generics)?;
        let self_type = Type::Named { id, name, generics: placeholders };
        self.declare_self(class_scope, self_type, decl.name.span)?;

        for attribute in &decl.attributes {
            let variable = VariableSymbol::new(
                attribute.value.name.value.name.clone(),
                VarType::Deferred { ty: attribute.value.ty.clone(), scope: class_scope },
                VariableKind::Attribute,
                attribute.value.name.span,
            )
            .mutable(true);
            self.scopes.add_variable(class_scope, variable)?;
        }

        self.scopes.exit_cur_scope();
        Ok(())
    }

    fn generate_enum(&mut self, decl: &ast::EnumDecl) -> SemaResult<()> {
        let here = self.scopes.current();
        let name = decl.name.value.name.clone();
        let id = self.scopes.add_type(
            here,
            TypeSymbol {
                name: name.clone(),
                kind: TypeSymbolKind::Enum,
                scope: None,
                bases: Vec::new(),
                span: decl.name.span,
            },
        )?;
        let enum_scope = self.scopes.into_new_scope(name.clone(), ScopeKind::Class(id));
        self.scopes.type_symbol_mut(id).scope = Some(enum_scope);

        for variant in &decl.variants {
            let variable = VariableSymbol::new(
                variant.value.name.clone(),
                VarType::Known(Type::named(id, name.clone())),
                VariableKind::EnumVariant,
                variant.span,
            );
            self.scopes.add_variable(enum_scope, variable)?;
        }

        self.scopes.exit_cur_scope();
        Ok(())
    }

    fn generate_sup(&mut self, decl: &ast::SupDecl) -> SemaResult<()> {
        let here = self.scopes.current();
        let target = self.sup_target(here, &decl.target)?;
        let base = match &decl.base {
            Some(base) => Some(self.sup_target(here, base)?),
            None => None,
        };
        let class_scope = self.member_scope(target, &decl.target)?;

        self.sup_counter += 1;
        let info = SupInfo {
            target,
            target_ast: decl.target.clone(),
            base,
            generics: decl.generics.iter().map(|g| g.value.name.name.clone()).collect(),
        };
        let name = format!("<sup {} #{}>", decl.target.value, self.sup_counter);
        let sup_scope = self.scopes.into_new_scope(name, ScopeKind::Sup(info));

        self.declare_generics(sup_scope, &decl.generics)?;
        let self_type = self.scopes.resolve_type_lenient(&decl.target, sup_scope)?;
        self.declare_self(sup_scope, self_type, decl.target.span)?;

        for member in &decl.members {
            match &member.value {
                ast::SupMember::Function(function) => self.generate_function(function)?,
                ast::SupMember::Typedef(typedef) => {
                    self.scopes.add_typedef(sup_scope, typedef)?;
                }
            }
        }
        self.scopes.exit_cur_scope();

        self.scopes.scope_mut(class_scope).sup_scopes.push(sup_scope);
        if let (Some(base), Some(base_ast)) = (base, &decl.base) {
            // Base methods sit one step further away than the overrides in this block.
            let base_scope = self.member_scope(base, base_ast)?;
            let inherited = self.scopes.scope(base_scope).sup_scopes.clone();
            self.scopes.scope_mut(sup_scope).sup_scopes.extend(inherited);
            self.scopes.type_symbol_mut(target).bases.push(base);
        }

        tracing::trace!(target = %decl.target.value, sup = self.sup_counter, "sup block generated");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Class or enum named by a sup header, which must already be generated.
    fn sup_target(&self, scope: ScopeId, ty: &Node<ast::Type>) -> SemaResult<TypeId> {
        let not_found = || SemanticError::new(SemanticErrorKind::SupTargetNotFound(ty.value.to_string()), ty.span);
        let path = match &ty.value {
            ast::Type::Single(path) => path,
            ast::Type::Tuple(_) => return Err(not_found()),
        };
        let id = self
            .scopes
            .lookup_type_id(scope, path, ty.span)
            .map_err(|_| not_found())?;
        let id = self.scopes.underlying_id(id);
        match self.scopes.type_symbol(id).kind {
            TypeSymbolKind::Class { .. } | TypeSymbolKind::Enum => Ok(id),
            _ => Err(not_found()),
        }
    }

    fn member_scope(&self, id: TypeId, ty: &Node<ast::Type>) -> SemaResult<ScopeId> {
        self.scopes.type_symbol(id).scope.ok_or_else(|| {
            SemanticError::new(SemanticErrorKind::SupTargetNotFound(ty.value.to_string()), ty.span)
        })
    }

    /// Declares generic placeholders in `scope` and returns them as types.
    fn declare_generics(&mut self, scope: ScopeId, generics: &[Node<ast::GenericParam>]) -> SemaResult<Vec<Type>> {
        let mut placeholders = Vec::with_capacity(generics.len());
        for generic in generics {
            let name = generic.value.name.name.clone();
            let id = self.scopes.add_type(
                scope,
                TypeSymbol {
                    name: name.clone(),
                    kind: TypeSymbolKind::Generic { constraints: generic.value.constraints.clone() },
                    scope: None,
                    bases: Vec::new(),
                    span: generic.span,
                },
            )?;
            placeholders.push(Type::named(id, name));
        }
        Ok(placeholders)
    }

    fn declare_self(&mut self, scope: ScopeId, target: Type, span: Span) -> SemaResult<TypeId> {
        let member_scope = self.scopes.class_scope_of(&target);
        self.scopes.add_type(
            scope,
            TypeSymbol {
                name: "Self".to_string(),
                kind: TypeSymbolKind::Alias { target },
                scope: member_scope,
                bases: Vec::new(),
                span,
            },
        )
    }
}

fn import_syntax(module: &str, errors: &[ParseError]) -> SemanticError {
    let (message, span) = errors
        .first()
        .map(|e| (e.message.clone(), e.span))
        .unwrap_or_else(|| ("unknown syntax error".to_string(), Span::default()));
    SemanticError::new(SemanticErrorKind::ImportSyntax { module: module.to_string(), message }, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;

    fn generate_with(source: &str, loader: &mut MemoryLoader) -> SemaResult<Generated> {
        let mut sources = SourceMap::new();
        let file_id = sources.add("main.spp", source);
        let program = spp_parser::parse_source(source, file_id).expect("test source must parse");
        SymbolGenerator::new(loader, &mut sources).generate(program, "main.spp")
    }

    fn generate(source: &str) -> SemaResult<Generated> {
        generate_with(source, &mut MemoryLoader::new())
    }

    #[test]
    fn test_prelude_types_visible_globally() {
        let generated = generate("").unwrap();
        let scopes = &generated.scopes;
        let global = scopes.global();
        for name in PRELUDE_TYPES {
            assert!(scopes.get_type(global, name).is_some(), "missing {}", name);
        }
        assert_eq!(scopes.get_type(global, "Num"), scopes.std_type_id("Num"));
        assert_eq!(generated.units.len(), 2);
        assert_eq!(generated.units[0].name, PRELUDE_NAME);
    }

    #[test]
    fn test_overloads_share_one_group() {
        let generated = generate(
            "fn f(a: Num) -> Num { ret a; }\n\
             fn f(a: Str) -> Str { ret a; }",
        )
        .unwrap();
        let scopes = &generated.scopes;
        let global = scopes.global();
        assert_eq!(scopes.collect_overloads(global, "f").len(), 2);
        let group = scopes.get_variable(global, "f").unwrap();
        assert_eq!(group.kind, VariableKind::Function);
    }

    #[test]
    fn test_function_name_clashing_with_variable_is_rejected() {
        let mut scopes = ScopeHandler::new();
        let global = scopes.global();
        let local = VariableSymbol::new("f", VarType::Known(Type::Tuple(vec![])), VariableKind::Local, Span::default());
        scopes.add_variable(global, local).unwrap();
        let result = scopes.add_function(FunctionSymbol {
            name: "f".into(),
            generics: vec![],
            params: vec![],
            return_type: None,
            decorators: vec![],
            has_body: true,
            scope: global,
            owner: global,
            flags: FunctionFlags::default(),
            span: Span::default(),
        });
        assert!(matches!(result.unwrap_err().kind, SemanticErrorKind::DuplicateSymbol(_)));
    }

    #[test]
    fn test_sup_before_class_is_rejected() {
        let err = generate("sup Point { fn f(&self) {} }\ncls Point {}").unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::SupTargetNotFound(ref n) if n == "Point"));
    }

    #[test]
    fn test_inheritance_links() {
        let generated = generate(
            "cls Animal {}\n\
             sup Animal { @meta.virtual_method fn speak(&self) -> Str { ret \"...\"; } }\n\
             cls Dog {}\n\
             sup Animal for Dog { fn speak(&self) -> Str { ret \"woof\"; } }",
        )
        .unwrap();
        let scopes = &generated.scopes;
        let global = scopes.global();
        let animal = scopes.get_type(global, "Animal").unwrap();
        let dog = scopes.get_type(global, "Dog").unwrap();
        assert_eq!(scopes.type_symbol(dog).bases, vec![animal]);
        assert!(scopes.is_subtype(dog, animal));
        assert!(!scopes.is_subtype(animal, dog));

        let dog_scope = scopes.type_symbol(dog).scope.unwrap();
        let candidates = scopes.collect_overloads(dog_scope, "speak");
        assert_eq!(candidates.len(), 2);
        let distances: Vec<i32> = candidates
            .iter()
            .map(|c| scopes.level_of_sup_scope(dog_scope, scopes.function(*c).owner))
            .collect();
        assert_eq!(distances, vec![1, 2]);
    }

    #[test]
    fn test_imports_alias_named_types() {
        let mut loader = MemoryLoader::new().with_module("geo.shapes", "cls Circle { r: Num; }\ncls Square {}");
        let generated = generate_with("use geo.shapes.Circle;\nfn f(c: Circle) {}", &mut loader).unwrap();
        let scopes = &generated.scopes;
        let global = scopes.global();
        let module = scopes.get_child_scope(global, &["geo", "shapes"]).unwrap();
        assert_eq!(scopes.get_type(global, "Circle"), scopes.get_type_exclusive(module, "Circle"));
        assert!(scopes.get_type(global, "Square").is_none());
        let names: Vec<&str> = generated.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec![PRELUDE_NAME, "geo/shapes.spp", "main.spp"]);
    }

    #[test]
    fn test_missing_module_and_bad_syntax() {
        let err = generate("use nowhere.Thing;").unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::ModuleNotFound(ref m, _) if m == "nowhere"));

        let mut loader = MemoryLoader::new().with_module("broken", "cls {");
        let err = generate_with("use broken;", &mut loader).unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::ImportSyntax { ref module, .. } if module == "broken"));
    }

    #[test]
    fn test_cyclic_import_is_generated_once() {
        let mut loader = MemoryLoader::new()
            .with_module("a", "use b;\ncls A {}")
            .with_module("b", "use a;\ncls B {}");
        let generated = generate_with("use a.A;", &mut loader).unwrap();
        let count = generated.units.iter().filter(|u| u.name == "a.spp").count();
        assert_eq!(count, 1);
        assert_eq!(generated.units.len(), 4);
    }
}
