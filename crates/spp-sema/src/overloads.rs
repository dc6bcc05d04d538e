//! Overload groups: the lowered form of same-named function declarations.
//!
//! Every scope owns an [`OverloadRegistry`]. Declaring `fn f` twice in one
//! scope produces a single group `f` with two candidates, in declaration
//! order. Call sites gather candidates from the registry of the scope that
//! owns the name plus the registries of its sup scopes.

use std::collections::BTreeMap;

use crate::symbols::FunctionId;

#[derive(Debug, Clone, Default)]
pub struct OverloadGroup {
    pub name: String,
    pub candidates: Vec<FunctionId>,
}

#[derive(Debug, Clone, Default)]
pub struct OverloadRegistry {
    groups: BTreeMap<String, OverloadGroup>,
}

impl OverloadRegistry {
    /// Adds a candidate; returns `true` when this opened a new group.
    pub fn add(&mut self, name: &str, function: FunctionId) -> bool {
        match self.groups.get_mut(name) {
            Some(group) => {
                group.candidates.push(function);
                false
            }
            None => {
                self.groups.insert(
                    name.to_string(),
                    OverloadGroup {
                        name: name.to_string(),
                        candidates: vec![function],
                    },
                );
                true
            }
        }
    }

    pub fn group(&self, name: &str) -> Option<&OverloadGroup> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &OverloadGroup> {
        self.groups.values()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
