//! Helpers for tests that translate Oak snippets

use std::collections::HashMap;
use std::path::PathBuf;

use super::context::CompileContext;
use super::pipeline::translate_source;
use crate::frontend::preprocess::{MacroHandle, MacroRuntime, RuntimeError};
use crate::middle::codegen::render;
use crate::util::config::CompilerConfig;
use crate::util::diagnostic::Result;

/// Macro runtime answering every invocation of a macro with canned output.
///
/// `{args}` in the output is replaced by the arguments joined with spaces.
#[derive(Debug, Default)]
pub struct CannedRuntime {
    pub outputs: HashMap<String, String>,
    pub compiled: Vec<String>,
}

impl CannedRuntime {
    pub fn with(
        name: &str,
        output: &str,
    ) -> Self {
        let mut runtime = Self::default();
        runtime.outputs.insert(name.to_string(), output.to_string());
        runtime
    }
}

impl MacroRuntime for CannedRuntime {
    fn compile(
        &mut self,
        name: &str,
        _source: &str,
    ) -> std::result::Result<MacroHandle, RuntimeError> {
        self.compiled.push(name.to_string());
        Ok(MacroHandle {
            name: name.to_string(),
            binary: PathBuf::from(format!("{}.bin", name)),
        })
    }

    fn invoke(
        &mut self,
        handle: &MacroHandle,
        args: &[String],
    ) -> std::result::Result<String, RuntimeError> {
        let output = self.outputs.get(&handle.name).cloned().unwrap_or_default();
        Ok(output.replace("{args}", &args.join(" ")))
    }
}

/// Configuration without style checks or dumps
pub fn quiet_config() -> CompilerConfig {
    CompilerConfig {
        style_checks: false,
        dump_on_error: false,
        emit_only: true,
        ..CompilerConfig::default()
    }
}

pub fn quiet_context() -> CompileContext {
    CompileContext::with_runtime(quiet_config(), Box::new(CannedRuntime::default()))
}

/// Translate `source` in a fresh context
pub fn sequence(source: &str) -> Result<CompileContext> {
    let mut ctx = quiet_context();
    translate_source(&mut ctx, "test.oak", source)?;
    Ok(ctx)
}

/// Translate `source` and render it as C
pub fn to_c(source: &str) -> Result<String> {
    sequence(source).map(|ctx| render(&ctx))
}
