//! File driver
//!
//! Owns the compilation context and runs the phases over each file,
//! recursing for `include!` and `package!`, then builds the program.

pub mod build;
pub mod context;
pub mod directives;
pub mod dump;
pub mod host;
pub mod packages;
pub mod pipeline;
pub mod style;

#[cfg(test)]
pub(crate) mod testing;

pub use build::{build_program, compile_project, invoke_c_compiler, translate_files, BuildOutput};
pub use context::{CompileContext, Cursor};
pub use host::OsHost;
pub use pipeline::{translate_file, translate_source};
