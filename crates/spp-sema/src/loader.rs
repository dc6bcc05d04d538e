//! Source loading for `use` imports

use std::collections::HashMap;
use thiserror::Error;

/// Source text of one module
#[derive(Debug, Clone)]
pub struct LoadedModule {
    /// Display name used in diagnostics, usually a file path
    pub name: String,
    pub source: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no module found at {0}")]
    NotFound(String),
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// Maps a dotted module path such as `["geo", "shapes"]` to source text.
pub trait ModuleLoader {
    fn load(&mut self, path: &[String]) -> Result<LoadedModule, LoadError>;
}

/// In-memory modules keyed by dotted path
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    modules: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, path: &str, source: &str) -> Self {
        self.insert(path, source);
        self
    }

    pub fn insert(&mut self, path: &str, source: &str) {
        self.modules.insert(path.to_string(), source.to_string());
    }
}

impl ModuleLoader for MemoryLoader {
    fn load(&mut self, path: &[String]) -> Result<LoadedModule, LoadError> {
        let key = path.join(".");
        match self.modules.get(&key) {
            Some(source) => Ok(LoadedModule { name: format!("{}.spp", key.replace('.', "/")), source: source.clone() }),
            None => Err(LoadError::NotFound(key)),
        }
    }
}
