//! Acorn, the Oak to C translator
//!
//! Oak source goes through macro expansion, rule rewriting and operator
//! substitution as tokens, is sequenced into typed definitions (generics
//! are instantiated as they are used) and is rendered as one C file.
//!
//! # Example
//!
//! ```no_run
//! use acorn::{translate, Result};
//!
//! fn main() -> Result<()> {
//!     let c = translate(
//!         "let main() -> i32 { return 0; }",
//!         "main.oak",
//!     )?;
//!     assert!(c.contains("int32_t main(void)"));
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod driver;
pub mod frontend;
pub mod middle;
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

use std::path::PathBuf;

use tracing::debug;

use crate::driver::{compile_project, translate_source, BuildOutput, CompileContext};
use crate::util::config::CompilerConfig;

/// Translator version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Translator name
pub const NAME: &str = "Acorn";

/// Translate one piece of Oak source to C, without style checks or dumps
pub fn translate(
    source: &str,
    name: &str,
) -> Result<String> {
    let config = CompilerConfig {
        style_checks: false,
        dump_on_error: false,
        emit_only: true,
        ..CompilerConfig::default()
    };
    let mut ctx = CompileContext::new(config);
    translate_source(&mut ctx, name, source).with_context(|| format!("Failed to translate {}", name))?;
    debug!("Translated {} with {} warnings", name, ctx.warnings.len());
    Ok(middle::render(&ctx))
}

/// Build a program from source files
pub fn compile(
    config: &CompilerConfig,
    files: &[PathBuf],
) -> Result<BuildOutput> {
    let output = compile_project(config, files).context("Build failed")?;
    Ok(output)
}
