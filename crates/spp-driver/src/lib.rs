//! SPP Compiler Driver Library
//!
//! Pipeline glue shared by the `spp` binary and its tests: filesystem
//! module loading and the read → parse → analyse sequence.

pub mod resolver;
pub mod pipeline;

pub use resolver::FsModuleLoader;
pub use pipeline::{check_file, generate_file, module_root, parse_file, CheckFailure};
