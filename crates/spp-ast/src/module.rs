//! Module system definitions for the AST

use super::*;

/// Root node of a parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// mod a.b;
    pub module_name: Option<Node<Vec<Ident>>>,
    pub imports: Vec<Node<ImportDecl>>,
    pub members: Vec<Node<ModuleMember>>,
}

/// Import: `use geo.shapes.Circle;` or `use geo.shapes.{Circle, Square};`
///
/// `path` holds the module segments, `names` the imported types. A bare
/// module import (`use geo.shapes;`) has no names.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: Vec<Node<Ident>>,
    pub names: Vec<Node<Ident>>,
}

impl ImportDecl {
    pub fn module_path(&self) -> Vec<String> {
        self.path.iter().map(|p| p.value.name.clone()).collect()
    }
}

/// Top-level item in a module
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleMember {
    Function(FunctionDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    Sup(SupDecl),
    Typedef(TypedefDecl),
}
