//! Scope arena and symbol tables

use std::collections::{BTreeMap, HashSet, VecDeque};

use spp_ast::{self as ast, Node, Span};

use crate::error::{SemaResult, SemanticError, SemanticErrorKind};
use crate::overloads::OverloadRegistry;
use crate::suggest;
use crate::symbols::{
    FunctionId, FunctionSymbol, ScopeId, TagSymbol, TypeId, TypeSymbol, VarType, VariableKind,
    VariableSymbol,
};
use crate::types::{FunctionRef, Type};

/// Details of a sup block scope
#[derive(Debug, Clone)]
pub struct SupInfo {
    pub target: TypeId,
    pub target_ast: Node<ast::Type>,
    /// `X` in `sup X for Y`
    pub base: Option<TypeId>,
    pub generics: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum ScopeKind {
    Global,
    /// Namespace segment of an imported module path
    Module(String),
    Class(TypeId),
    Sup(SupInfo),
    Function(FunctionId),
    /// Body block created during analysis
    Block,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub name: String,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    pub sup_scopes: Vec<ScopeId>,
    pub variables: BTreeMap<String, VariableSymbol>,
    pub types: BTreeMap<String, TypeId>,
    pub tags: BTreeMap<String, TagSymbol>,
    pub overloads: OverloadRegistry,
    pub visited: bool,
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Variables,
    Types,
    Tags,
}

impl Scope {
    /// Entered by `next_scope`; module and block scopes are entered explicitly
    pub fn is_traversable(&self) -> bool {
        matches!(self.kind, ScopeKind::Class(_) | ScopeKind::Sup(_) | ScopeKind::Function(_))
    }

    fn has(&self, table: Table, name: &str) -> bool {
        match table {
            Table::Variables => self.variables.contains_key(name),
            Table::Types => self.types.contains_key(name),
            Table::Tags => self.tags.contains_key(name),
        }
    }

    fn names(&self, table: Table) -> Vec<String> {
        match table {
            Table::Variables => self.variables.keys().cloned().collect(),
            Table::Types => self.types.keys().cloned().collect(),
            Table::Tags => self.tags.keys().cloned().collect(),
        }
    }
}

/// Arena of scopes with the current position of the traversal
#[derive(Debug, Clone)]
pub struct ScopeHandler {
    scopes: Vec<Scope>,
    type_symbols: Vec<TypeSymbol>,
    functions: Vec<FunctionSymbol>,
    current: ScopeId,
}

impl Default for ScopeHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeHandler {
    pub fn new() -> Self {
        let global = Scope {
            id: ScopeId(0),
            name: "<global>".to_string(),
            kind: ScopeKind::Global,
            parent: None,
            children: Vec::new(),
            sup_scopes: Vec::new(),
            variables: BTreeMap::new(),
            types: BTreeMap::new(),
            tags: BTreeMap::new(),
            overloads: OverloadRegistry::default(),
            visited: true,
        };
        Self {
            scopes: vec![global],
            type_symbols: Vec::new(),
            functions: Vec::new(),
            current: ScopeId(0),
        }
    }

    // =========================================================================
    // Arena access
    // =========================================================================

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.type_symbols[id.0]
    }

    pub fn type_symbol_mut(&mut self, id: TypeId) -> &mut TypeSymbol {
        &mut self.type_symbols[id.0]
    }

    pub fn function(&self, id: FunctionId) -> &FunctionSymbol {
        &self.functions[id.0]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut FunctionSymbol {
        &mut self.functions[id.0]
    }

    /// Id the next `add_function` will hand out
    pub fn next_function_id(&self) -> FunctionId {
        FunctionId(self.functions.len())
    }

    pub fn type_symbols(&self) -> &[TypeSymbol] {
        &self.type_symbols
    }

    pub fn functions(&self) -> &[FunctionSymbol] {
        &self.functions
    }

    // =========================================================================
    // Movement
    // =========================================================================

    /// Creates a child of the current scope and moves into it.
    ///
    /// Block scopes are born visited so that a later `next_scope` never
    /// descends into them.
    pub fn into_new_scope(&mut self, name: impl Into<String>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        let visited = matches!(kind, ScopeKind::Block);
        self.scopes.push(Scope {
            id,
            name: name.into(),
            kind,
            parent: Some(self.current),
            children: Vec::new(),
            sup_scopes: Vec::new(),
            variables: BTreeMap::new(),
            types: BTreeMap::new(),
            tags: BTreeMap::new(),
            overloads: OverloadRegistry::default(),
            visited,
        });
        self.scopes[self.current.0].children.push(id);
        self.current = id;
        id
    }

    pub fn exit_cur_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].parent {
            self.current = parent;
        }
    }

    /// Jumps to an existing scope (analysis units start this way).
    pub fn enter(&mut self, id: ScopeId) {
        self.current = id;
    }

    /// Descends into the first unvisited declaration scope below the current one.
    pub fn next_scope(&mut self) -> SemaResult<ScopeId> {
        let next = self.scopes[self.current.0]
            .children
            .iter()
            .copied()
            .find(|c| {
                let child = &self.scopes[c.0];
                child.is_traversable() && !child.visited
            });

        match next {
            Some(id) => {
                self.scopes[id.0].visited = true;
                self.current = id;
                tracing::trace!(scope = %self.scopes[id.0].name, "next_scope");
                Ok(id)
            }
            None => Err(SemanticError::new(
                SemanticErrorKind::TraversalMismatch(format!(
                    "no unvisited child below '{}'",
                    self.scopes[self.current.0].name
                )),
                Span::default(),
            )),
        }
    }

    pub fn prev_scope(&mut self) {
        self.exit_cur_scope();
    }

    pub fn reset_visited(&mut self) {
        for scope in &mut self.scopes {
            scope.visited = false;
        }
    }

    // =========================================================================
    // Adding symbols
    // =========================================================================

    pub fn add_variable(&mut self, scope: ScopeId, symbol: VariableSymbol) -> SemaResult<()> {
        let table = &mut self.scopes[scope.0].variables;
        if table.contains_key(&symbol.name) {
            return Err(SemanticError::new(
                SemanticErrorKind::DuplicateSymbol(symbol.name.clone()),
                symbol.span,
            ));
        }
        table.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    pub fn add_type(&mut self, scope: ScopeId, symbol: TypeSymbol) -> SemaResult<TypeId> {
        if self.scopes[scope.0].types.contains_key(&symbol.name) {
            return Err(SemanticError::new(
                SemanticErrorKind::DuplicateSymbol(symbol.name.clone()),
                symbol.span,
            ));
        }
        let id = TypeId(self.type_symbols.len());
        self.scopes[scope.0].types.insert(symbol.name.clone(), id);
        self.type_symbols.push(symbol);
        Ok(id)
    }

    /// Makes an existing type visible in `scope` under `name`.
    pub fn add_type_alias(&mut self, scope: ScopeId, name: &str, id: TypeId, span: Span) -> SemaResult<()> {
        let table = &mut self.scopes[scope.0].types;
        match table.get(name) {
            Some(existing) if *existing == id => Ok(()),
            Some(_) => Err(SemanticError::new(SemanticErrorKind::DuplicateSymbol(name.to_string()), span)),
            None => {
                table.insert(name.to_string(), id);
                Ok(())
            }
        }
    }

    pub fn add_tag(&mut self, scope: ScopeId, tag: TagSymbol) -> SemaResult<()> {
        let table = &mut self.scopes[scope.0].tags;
        if table.contains_key(&tag.name) {
            return Err(SemanticError::new(
                SemanticErrorKind::DuplicateSymbol(tag.name.clone()),
                tag.span,
            ));
        }
        table.insert(tag.name.clone(), tag);
        Ok(())
    }

    /// Registers an overload candidate in its owner scope. The first
    /// candidate of a name also declares the function-group variable.
    pub fn add_function(&mut self, symbol: FunctionSymbol) -> SemaResult<FunctionId> {
        let owner = symbol.owner;
        let name = symbol.name.clone();
        let span = symbol.span;

        if let Some(existing) = self.scopes[owner.0].variables.get(&name) {
            if existing.kind != VariableKind::Function {
                return Err(SemanticError::new(SemanticErrorKind::DuplicateSymbol(name), span));
            }
        }

        let id = FunctionId(self.functions.len());
        self.functions.push(symbol);

        if self.scopes[owner.0].overloads.add(&name, id) {
            let group = Type::Function(FunctionRef {
                name: name.clone(),
                scope: owner,
                receiver: None,
                bound: false,
            });
            let variable = VariableSymbol::new(name, VarType::Known(group), VariableKind::Function, span);
            self.add_variable(owner, variable)?;
        }
        Ok(id)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Searches `scope` merged with its sup scopes, then each parent in turn.
    /// Sup scopes are searched without climbing their own parents.
    fn search(&self, scope: ScopeId, table: Table, name: &str) -> Option<ScopeId> {
        let mut visited = HashSet::new();
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if let Some(found) = self.search_exclusive(id, table, name, &mut visited) {
                return Some(found);
            }
            cursor = self.scopes[id.0].parent;
        }
        None
    }

    fn search_exclusive(
        &self,
        scope: ScopeId,
        table: Table,
        name: &str,
        visited: &mut HashSet<ScopeId>,
    ) -> Option<ScopeId> {
        if !visited.insert(scope) {
            return None;
        }
        let current = &self.scopes[scope.0];
        if current.has(table, name) {
            return Some(scope);
        }
        current
            .sup_scopes
            .iter()
            .find_map(|sup| self.search_exclusive(*sup, table, name, visited))
    }

    /// Variable visible from `scope`, with the scope that declares it.
    pub fn locate_variable(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &VariableSymbol)> {
        let found = self.search(scope, Table::Variables, name)?;
        self.scopes[found.0].variables.get(name).map(|v| (found, v))
    }

    pub fn get_variable(&self, scope: ScopeId, name: &str) -> Option<&VariableSymbol> {
        self.locate_variable(scope, name).map(|(_, v)| v)
    }

    /// Variable in `scope` or its sup scopes only.
    pub fn get_variable_exclusive(&self, scope: ScopeId, name: &str) -> Option<&VariableSymbol> {
        let found = self.search_exclusive(scope, Table::Variables, name, &mut HashSet::new())?;
        self.scopes[found.0].variables.get(name)
    }

    pub fn variable_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut VariableSymbol> {
        self.scopes[scope.0].variables.get_mut(name)
    }

    pub fn get_type(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        let found = self.search(scope, Table::Types, name)?;
        self.scopes[found.0].types.get(name).copied()
    }

    pub fn get_type_exclusive(&self, scope: ScopeId, name: &str) -> Option<TypeId> {
        let found = self.search_exclusive(scope, Table::Types, name, &mut HashSet::new())?;
        self.scopes[found.0].types.get(name).copied()
    }

    pub fn get_tag(&self, scope: ScopeId, name: &str) -> Option<&TagSymbol> {
        let found = self.search(scope, Table::Tags, name)?;
        self.scopes[found.0].tags.get(name)
    }

    pub fn has_symbol(&self, scope: ScopeId, name: &str) -> bool {
        self.get_variable(scope, name).is_some() || self.get_type(scope, name).is_some()
    }

    pub fn has_symbol_exclusive(&self, scope: ScopeId, name: &str) -> bool {
        self.get_variable_exclusive(scope, name).is_some() || self.get_type_exclusive(scope, name).is_some()
    }

    /// Variable lookup that fails with a "did you mean" hint.
    pub fn resolve_variable(&self, scope: ScopeId, name: &str, span: Span) -> SemaResult<(ScopeId, &VariableSymbol)> {
        match self.locate_variable(scope, name) {
            Some(found) => Ok(found),
            None => {
                let mut error = SemanticError::new(SemanticErrorKind::UnknownIdentifier(name.to_string()), span);
                if let Some(similar) = suggest::closest(name, &self.visible_names(scope, Table::Variables)) {
                    error = error.with_help(format!("did you mean '{}'?", similar));
                }
                Err(error)
            }
        }
    }

    /// Type lookup that fails with a "did you mean" hint.
    pub fn resolve_type_name(&self, scope: ScopeId, name: &str, span: Span) -> SemaResult<TypeId> {
        match self.get_type(scope, name) {
            Some(id) => Ok(id),
            None => {
                let mut error = SemanticError::new(SemanticErrorKind::UnknownType(name.to_string()), span);
                if let Some(similar) = suggest::closest(name, &self.visible_names(scope, Table::Types)) {
                    error = error.with_help(format!("did you mean '{}'?", similar));
                }
                Err(error)
            }
        }
    }

    pub fn resolve_tag(&self, scope: ScopeId, name: &str, span: Span) -> SemaResult<&TagSymbol> {
        self.get_tag(scope, name)
            .ok_or_else(|| SemanticError::new(SemanticErrorKind::UnknownTag(name.to_string()), span))
    }

    fn visible_names(&self, scope: ScopeId, table: Table) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            self.collect_names(id, table, &mut visited, &mut out);
            cursor = self.scopes[id.0].parent;
        }
        out
    }

    fn collect_names(&self, scope: ScopeId, table: Table, visited: &mut HashSet<ScopeId>, out: &mut Vec<String>) {
        let mut stack = vec![scope];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let s = &self.scopes[id.0];
            out.extend(s.names(table));
            stack.extend(s.sup_scopes.iter().copied());
        }
    }

    /// Variable names of `scope` and its sup scopes (members of a class).
    pub fn member_names(&self, scope: ScopeId) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(scope, Table::Variables, &mut HashSet::new(), &mut out);
        out
    }

    // =========================================================================
    // Scope graph queries
    // =========================================================================

    /// Descends from `from` through children named by each path segment.
    pub fn get_child_scope(&self, from: ScopeId, path: &[&str]) -> Option<ScopeId> {
        let mut cursor = from;
        for segment in path {
            cursor = self.scopes[cursor.0]
                .children
                .iter()
                .copied()
                .find(|c| self.scopes[c.0].name == *segment)?;
        }
        Some(cursor)
    }

    /// Number of sup edges from `scope` to `target`; 0 when equal, -1 when unrelated.
    pub fn level_of_sup_scope(&self, scope: ScopeId, target: ScopeId) -> i32 {
        // Breadth first, so the first hit is the shortest chain.
        let mut seen = HashSet::from([scope]);
        let mut queue = VecDeque::from([(scope, 0)]);
        while let Some((id, level)) = queue.pop_front() {
            if id == target {
                return level;
            }
            for sup in &self.scopes[id.0].sup_scopes {
                if seen.insert(*sup) {
                    queue.push_back((*sup, level + 1));
                }
            }
        }
        -1
    }

    /// Overload candidates named `name` in `scope` and its sup scopes, in
    /// declaration order of the scopes' registries.
    pub fn collect_overloads(&self, scope: ScopeId, name: &str) -> Vec<FunctionId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![scope];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let s = &self.scopes[id.0];
            if let Some(group) = s.overloads.group(name) {
                out.extend(group.candidates.iter().copied());
            }
            for sup in s.sup_scopes.iter().rev() {
                stack.push(*sup);
            }
        }
        out
    }

    /// `sub` is `sup` or reaches it through superimposed bases.
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        let mut stack = vec![sub];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == sup {
                return true;
            }
            if seen.insert(id) {
                stack.extend(self.type_symbols[id.0].bases.iter().copied());
            }
        }
        false
    }

    /// Nearest enclosing function scope of the current position.
    pub fn enclosing_function(&self) -> Option<FunctionId> {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            match self.scopes[id.0].kind {
                ScopeKind::Function(f) => return Some(f),
                ScopeKind::Block => cursor = self.scopes[id.0].parent,
                _ => return None,
            }
        }
        None
    }

    /// Nearest sup block enclosing `scope`, stopping at module level.
    pub fn enclosing_sup(&self, scope: ScopeId) -> Option<&SupInfo> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            match &self.scopes[id.0].kind {
                ScopeKind::Sup(info) => return Some(info),
                ScopeKind::Global | ScopeKind::Module(_) => return None,
                _ => cursor = self.scopes[id.0].parent,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::TypeSymbolKind;

    fn span() -> Span {
        Span::default()
    }

    fn local(name: &str) -> VariableSymbol {
        VariableSymbol::new(name, VarType::Known(Type::Tuple(vec![])), VariableKind::Local, span())
    }

    fn class(name: &str) -> TypeSymbol {
        TypeSymbol {
            name: name.to_string(),
            kind: TypeSymbolKind::Class { generics: vec![] },
            scope: None,
            bases: vec![],
            span: span(),
        }
    }

    #[test]
    fn test_lookup_is_visible_downward_only() {
        let mut scopes = ScopeHandler::new();
        let global = scopes.global();
        let outer = scopes.into_new_scope("outer", ScopeKind::Block);
        scopes.add_variable(outer, local("x")).unwrap();
        let inner = scopes.into_new_scope("inner", ScopeKind::Block);
        scopes.exit_cur_scope();
        scopes.exit_cur_scope();
        let sibling = scopes.into_new_scope("sibling", ScopeKind::Block);

        assert!(scopes.get_variable(outer, "x").is_some());
        assert!(scopes.get_variable(inner, "x").is_some());
        assert!(scopes.get_variable(global, "x").is_none());
        assert!(scopes.get_variable(sibling, "x").is_none());
    }

    #[test]
    fn test_lookup_through_sup_scopes_does_not_climb_their_parents() {
        let mut scopes = ScopeHandler::new();
        let a = scopes.into_new_scope("a", ScopeKind::Block);
        scopes.add_variable(a, local("only_in_a")).unwrap();
        let sup = scopes.into_new_scope("sup", ScopeKind::Block);
        scopes.add_variable(sup, local("method")).unwrap();
        scopes.enter(scopes.global());
        let class_scope = scopes.into_new_scope("C", ScopeKind::Block);
        scopes.scope_mut(class_scope).sup_scopes.push(sup);

        assert!(scopes.get_variable(class_scope, "method").is_some());
        assert!(scopes.get_variable_exclusive(class_scope, "method").is_some());
        assert!(scopes.get_variable(class_scope, "only_in_a").is_none());
    }

    #[test]
    fn test_duplicate_symbols_rejected_per_table() {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        scopes.add_variable(g, local("Point")).unwrap();
        scopes.add_type(g, class("Point")).unwrap();

        let err = scopes.add_type(g, class("Point")).unwrap_err();
        assert!(matches!(err.kind, SemanticErrorKind::DuplicateSymbol(ref n) if n == "Point"));
        assert!(scopes.add_variable(g, local("Point")).is_err());
    }

    #[test]
    fn test_level_of_sup_scope() {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        let class_scope = scopes.into_new_scope("C", ScopeKind::Block);
        scopes.enter(g);
        let near = scopes.into_new_scope("near", ScopeKind::Block);
        scopes.enter(g);
        let far = scopes.into_new_scope("far", ScopeKind::Block);
        scopes.enter(g);
        let unrelated = scopes.into_new_scope("other", ScopeKind::Block);
        scopes.scope_mut(class_scope).sup_scopes.push(near);
        scopes.scope_mut(near).sup_scopes.push(far);

        assert_eq!(scopes.level_of_sup_scope(class_scope, class_scope), 0);
        assert_eq!(scopes.level_of_sup_scope(class_scope, near), 1);
        assert_eq!(scopes.level_of_sup_scope(class_scope, far), 2);
        assert_eq!(scopes.level_of_sup_scope(class_scope, unrelated), -1);
    }

    #[test]
    fn test_level_of_sup_scope_takes_the_shortest_chain() {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        let mut block = |name: &str| {
            scopes.enter(g);
            scopes.into_new_scope(name, ScopeKind::Block)
        };
        let (c, a, x, t) = (block("C"), block("A"), block("X"), block("T"));
        scopes.scope_mut(c).sup_scopes.extend([a, x]);
        scopes.scope_mut(a).sup_scopes.push(x);
        scopes.scope_mut(x).sup_scopes.push(t);

        assert_eq!(scopes.level_of_sup_scope(c, x), 1);
        assert_eq!(scopes.level_of_sup_scope(c, t), 2);
        assert_eq!(scopes.level_of_sup_scope(a, t), 2);
        assert_eq!(scopes.level_of_sup_scope(t, c), -1);
    }

    #[test]
    fn test_has_symbol_covers_own_sup_and_parent_scopes() {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        scopes.add_type(g, class("Point")).unwrap();
        let class_scope = scopes.into_new_scope("C", ScopeKind::Block);
        scopes.add_variable(class_scope, local("own")).unwrap();
        scopes.enter(g);
        let sup = scopes.into_new_scope("sup", ScopeKind::Block);
        scopes.add_variable(sup, local("method")).unwrap();
        scopes.scope_mut(class_scope).sup_scopes.push(sup);

        assert!(scopes.has_symbol(class_scope, "own"));
        assert!(scopes.has_symbol_exclusive(class_scope, "own"));
        assert!(scopes.has_symbol(class_scope, "method"));
        assert!(scopes.has_symbol_exclusive(class_scope, "method"));
        assert!(scopes.has_symbol(class_scope, "Point"));
        assert!(!scopes.has_symbol_exclusive(class_scope, "Point"));
        assert!(!scopes.has_symbol(g, "own"));
        assert!(!scopes.has_symbol(class_scope, "missing"));
    }

    #[test]
    fn test_next_scope_skips_blocks_and_reports_mismatch() {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        scopes.into_new_scope("<block>", ScopeKind::Block);
        scopes.enter(g);
        let f = scopes.into_new_scope("f", ScopeKind::Function(FunctionId(0)));
        scopes.enter(g);

        assert_eq!(scopes.next_scope().unwrap(), f);
        scopes.prev_scope();
        let err = scopes.next_scope().unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn test_unknown_identifier_suggests_closest() {
        let mut scopes = ScopeHandler::new();
        let g = scopes.global();
        scopes.add_variable(g, local("counter")).unwrap();
        scopes.add_variable(g, local("total")).unwrap();

        let err = scopes.resolve_variable(g, "countr", span()).unwrap_err();
        assert_eq!(err.help.as_deref(), Some("did you mean 'counter'?"));
    }
}
