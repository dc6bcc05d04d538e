//! Read, parse and analyse one input file

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use spp_ast::Program;
use spp_parser::ParseError;
use spp_sema::{Analysis, Generated, SemanticError, SourceMap};

use crate::resolver::FsModuleLoader;

/// Environment variable naming the module root when `--root` is not given
pub const ROOT_ENV: &str = "SPP_ROOT";

/// Why a file did not make it through the pipeline
#[derive(Debug)]
pub enum CheckFailure {
    Io { path: PathBuf, error: io::Error },
    /// Syntax errors in the input file itself
    Parse(Vec<ParseError>),
    Semantic(SemanticError),
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::Io { path, error } => write!(f, "cannot read {}: {}", path.display(), error),
            CheckFailure::Parse(errors) => match errors.first() {
                Some(first) => write!(f, "{} ({} syntax error(s))", first, errors.len()),
                None => write!(f, "syntax error"),
            },
            CheckFailure::Semantic(error) => write!(f, "{}", error),
        }
    }
}

/// Directory imports resolve against: `--root`, then `SPP_ROOT`, then the
/// directory holding the input file.
pub fn module_root(input: &Path, explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(ROOT_ENV).map(PathBuf::from))
        .or_else(|| input.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Reads `input` into `sources` and parses it.
pub fn parse_file(input: &Path, sources: &mut SourceMap) -> Result<Program, CheckFailure> {
    let source = fs::read_to_string(input).map_err(|error| CheckFailure::Io { path: input.to_path_buf(), error })?;
    let file_id = sources.add(input.display().to_string(), source.as_str());
    spp_parser::parse_source(&source, file_id).map_err(CheckFailure::Parse)
}

/// Parses and fully analyses `input`, loading imports from `root`.
pub fn check_file(input: &Path, root: &Path, sources: &mut SourceMap) -> Result<Analysis, CheckFailure> {
    let program = parse_file(input, sources)?;
    let mut loader = FsModuleLoader::new(root);
    let name = input.display().to_string();
    spp_sema::analyse(program, &name, &mut loader, sources).map_err(CheckFailure::Semantic)
}

/// Symbol generation only, for dumping the scope arena.
pub fn generate_file(input: &Path, root: &Path, sources: &mut SourceMap) -> Result<Generated, CheckFailure> {
    let program = parse_file(input, sources)?;
    let mut loader = FsModuleLoader::new(root);
    let name = input.display().to_string();
    spp_sema::generate_symbols(program, &name, &mut loader, sources).map_err(CheckFailure::Semantic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, source: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_explicit_root_wins() {
        let root = module_root(Path::new("/src/main.spp"), Some(PathBuf::from("/lib")));
        assert_eq!(root, PathBuf::from("/lib"));
    }

    #[test]
    fn test_bare_file_name_uses_current_directory() {
        if std::env::var_os(ROOT_ENV).is_none() {
            assert_eq!(module_root(Path::new("main.spp"), None), PathBuf::from("."));
            assert_eq!(module_root(Path::new("/src/main.spp"), None), PathBuf::from("/src"));
        }
    }

    #[test]
    fn test_check_file_with_import() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "geo/point.spp", "cls Point { x: Num; y: Num; }");
        let main = write(
            dir.path(),
            "main.spp",
            "use geo.point.Point;\nfn main() { let p = Point{x: 1, y: 2}; let s: Num = p.x + p.y; }",
        );

        let mut sources = SourceMap::new();
        let analysis = check_file(&main, dir.path(), &mut sources).unwrap();
        assert_eq!(analysis.units.len(), 3);
        assert!(sources.files().iter().any(|f| f.name.ends_with("point.spp")));
    }

    #[test]
    fn test_check_file_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = SourceMap::new();

        let missing = dir.path().join("missing.spp");
        assert!(matches!(check_file(&missing, dir.path(), &mut sources), Err(CheckFailure::Io { .. })));

        let broken = write(dir.path(), "broken.spp", "fn main( {");
        assert!(matches!(check_file(&broken, dir.path(), &mut sources), Err(CheckFailure::Parse(_))));

        let wrong = write(dir.path(), "wrong.spp", "fn main() { let x: Num = \"s\"; }");
        match check_file(&wrong, dir.path(), &mut sources) {
            Err(CheckFailure::Semantic(error)) => {
                assert!(matches!(error.kind, spp_sema::SemanticErrorKind::TypeMismatch { .. }))
            }
            other => panic!("Expected semantic failure, got {:?}", other.map(|a| a.units.len())),
        }
    }
}
