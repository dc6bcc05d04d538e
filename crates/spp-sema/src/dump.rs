//! JSON view of the scope arena, for debugging symbol generation

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scope::{ScopeHandler, ScopeKind};
use crate::symbols::{TypeSymbolKind, VarType, VariableKind};

#[derive(Debug, Serialize)]
pub struct ArenaDump {
    pub scopes: Vec<ScopeDump>,
    pub types: Vec<TypeDump>,
    pub functions: Vec<FunctionDump>,
}

#[derive(Debug, Serialize)]
pub struct ScopeDump {
    pub id: usize,
    pub name: String,
    pub kind: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub sup_scopes: Vec<usize>,
    pub variables: Vec<VariableDump>,
    pub types: BTreeMap<String, usize>,
    pub tags: Vec<String>,
    pub overloads: BTreeMap<String, Vec<usize>>,
}

#[derive(Debug, Serialize)]
pub struct VariableDump {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub kind: VariableKind,
    pub mutable: bool,
    pub initialized: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub comptime: bool,
}

#[derive(Debug, Serialize)]
pub struct TypeDump {
    pub id: usize,
    pub name: String,
    pub kind: String,
    pub scope: Option<usize>,
    pub bases: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct FunctionDump {
    pub id: usize,
    pub signature: String,
    pub scope: usize,
    pub owner: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_virtual: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
}

pub fn dump_arena(scopes: &ScopeHandler) -> ArenaDump {
    let scope_dumps = scopes
        .scopes()
        .iter()
        .map(|scope| ScopeDump {
            id: scope.id.0,
            name: scope.name.clone(),
            kind: match &scope.kind {
                ScopeKind::Global => "global".to_string(),
                ScopeKind::Module(name) => format!("module {}", name),
                ScopeKind::Class(id) => format!("class #{}", id.0),
                ScopeKind::Sup(info) => format!("sup #{}", info.target.0),
                ScopeKind::Function(id) => format!("function #{}", id.0),
                ScopeKind::Block => "block".to_string(),
            },
            parent: scope.parent.map(|p| p.0),
            children: scope.children.iter().map(|c| c.0).collect(),
            sup_scopes: scope.sup_scopes.iter().map(|s| s.0).collect(),
            variables: scope
                .variables
                .values()
                .map(|var| VariableDump {
                    name: var.name.clone(),
                    ty: match &var.ty {
                        VarType::Known(ty) => ty.to_string(),
                        VarType::Deferred { ty, .. } => ty.value.to_string(),
                    },
                    kind: var.kind,
                    mutable: var.is_mutable,
                    comptime: var.is_comptime,
                    initialized: var.memory.is_initialized || var.kind != VariableKind::Local,
                })
                .collect(),
            types: scope.types.iter().map(|(name, id)| (name.clone(), id.0)).collect(),
            tags: scope.tags.keys().cloned().collect(),
            overloads: scope
                .overloads
                .groups()
                .map(|group| (group.name.clone(), group.candidates.iter().map(|f| f.0).collect()))
                .collect(),
        })
        .collect();

    let type_dumps = scopes
        .type_symbols()
        .iter()
        .enumerate()
        .map(|(id, symbol)| TypeDump {
            id,
            name: symbol.name.clone(),
            kind: match &symbol.kind {
                TypeSymbolKind::Class { .. } => "class".to_string(),
                TypeSymbolKind::Enum => "enum".to_string(),
                TypeSymbolKind::Generic { .. } => "generic".to_string(),
                TypeSymbolKind::Alias { target } => format!("alias of {}", target),
            },
            scope: symbol.scope.map(|s| s.0),
            bases: symbol.bases.iter().map(|b| b.0).collect(),
        })
        .collect();

    let function_dumps = scopes
        .functions()
        .iter()
        .enumerate()
        .map(|(id, func)| FunctionDump {
            id,
            signature: func.signature(),
            scope: func.scope.0,
            owner: func.owner.0,
            is_virtual: func.flags.is_virtual,
            is_abstract: func.flags.is_abstract,
            is_static: func.flags.is_static,
        })
        .collect();

    ArenaDump { scopes: scope_dumps, types: type_dumps, functions: function_dumps }
}

pub fn to_json(scopes: &ScopeHandler) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&dump_arena(scopes))
}
