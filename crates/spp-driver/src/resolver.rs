//! Module resolution for `use` imports

use std::fs;
use std::path::PathBuf;

use spp_sema::{LoadError, LoadedModule, ModuleLoader};

/// File extension of SPP source files
pub const SOURCE_EXTENSION: &str = "spp";

/// Loads modules from a directory tree: `a.b.c` lives at `<root>/a/b/c.spp`
#[derive(Debug, Clone)]
pub struct FsModuleLoader {
    root: PathBuf,
}

impl FsModuleLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File a dotted module path maps to
    pub fn module_path(&self, path: &[String]) -> PathBuf {
        let mut file = self.root.clone();
        for segment in path {
            file.push(segment);
        }
        file.set_extension(SOURCE_EXTENSION);
        file
    }
}

impl ModuleLoader for FsModuleLoader {
    fn load(&mut self, path: &[String]) -> Result<LoadedModule, LoadError> {
        let file = self.module_path(path);
        let file_display = file.display().to_string();
        tracing::debug!(module = %path.join("."), file = %file_display, "resolving import");

        if !file.is_file() {
            return Err(LoadError::NotFound(file_display));
        }
        let source = fs::read_to_string(&file).map_err(|e| LoadError::Io { path: file_display.clone(), message: e.to_string() })?;
        Ok(LoadedModule { name: file_display, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        path.split('.').map(String::from).collect()
    }

    #[test]
    fn test_dotted_path_maps_to_nested_file() {
        let loader = FsModuleLoader::new("/project");
        assert_eq!(loader.module_path(&segments("geo.shapes")), PathBuf::from("/project/geo/shapes.spp"));
        assert_eq!(loader.module_path(&segments("util")), PathBuf::from("/project/util.spp"));
    }

    #[test]
    fn test_load_reads_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("geo")).unwrap();
        fs::write(dir.path().join("geo/shapes.spp"), "cls Circle { r: Num; }").unwrap();

        let mut loader = FsModuleLoader::new(dir.path());
        let loaded = loader.load(&segments("geo.shapes")).unwrap();
        assert!(loaded.name.ends_with("shapes.spp"));
        assert_eq!(loaded.source, "cls Circle { r: Num; }");
    }

    #[test]
    fn test_missing_module() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = FsModuleLoader::new(dir.path());
        match loader.load(&segments("nowhere")) {
            Err(LoadError::NotFound(path)) => assert!(path.ends_with("nowhere.spp")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_not_a_module() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg.spp")).unwrap();
        let mut loader = FsModuleLoader::new(dir.path());
        assert!(matches!(loader.load(&segments("pkg")), Err(LoadError::NotFound(_))));
    }
}
