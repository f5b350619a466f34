//! Whole-program builds
//!
//! Translate every input file into one context, render the C translation
//! unit and hand it to the C compiler with the flags and objects the
//! program asked for.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::context::CompileContext;
use super::pipeline::translate_file;
use crate::middle::codegen::render;
use crate::util::config::CompilerConfig;
use crate::util::diagnostic::{CompileError, Phase, Result, ResultExt};

/// What a build produced
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub c_path: PathBuf,
    /// The executable, unless only C was emitted
    pub binary: Option<PathBuf>,
    pub warnings: usize,
}

/// Translate `files` into a single context
pub fn translate_files(
    config: &CompilerConfig,
    files: &[PathBuf],
) -> Result<CompileContext> {
    let mut ctx = CompileContext::new(config.clone());
    for file in files {
        translate_file(&mut ctx, file)?;
    }
    Ok(ctx)
}

/// Build `files` into the configured output
pub fn compile_project(
    config: &CompilerConfig,
    files: &[PathBuf],
) -> Result<BuildOutput> {
    build_program(config, files, &config.output)
}

/// Build `files` into an executable at `binary`
pub fn build_program(
    config: &CompilerConfig,
    files: &[PathBuf],
    binary: &Path,
) -> Result<BuildOutput> {
    let ctx = translate_files(config, files)?;
    let c_source = render(&ctx);

    let c_path = if config.macro_mode {
        binary.with_extension("c")
    } else {
        config.c_output()
    };
    if let Some(dir) = c_path.parent() {
        fs::create_dir_all(dir).map_err(|err| CompileError::io(dir, err))?;
    }
    fs::write(&c_path, &c_source)
        .map_err(|err| CompileError::io(&c_path, err))
        .in_file(&c_path.display().to_string(), Phase::Emitting)?;
    info!("Wrote {}", c_path.display());

    let warnings = ctx.warnings.len();
    if config.emit_only {
        return Ok(BuildOutput {
            c_path,
            binary: None,
            warnings,
        });
    }

    invoke_c_compiler(config, &c_path, binary, &ctx.flags, &ctx.links)?;
    Ok(BuildOutput {
        c_path,
        binary: Some(binary.to_path_buf()),
        warnings,
    })
}

/// Compile `c_path` to `binary`
pub fn invoke_c_compiler(
    config: &CompilerConfig,
    c_path: &Path,
    binary: &Path,
    flags: &[String],
    links: &[String],
) -> Result<()> {
    let mut command = Command::new(&config.c_compiler);
    command
        .arg(c_path)
        .args(links)
        .arg("-o")
        .arg(binary)
        .args(&config.c_flags)
        .args(flags);
    debug!("Running {:?}", command);

    let output = command.output().map_err(|err| CompileError::CCompiler {
        compiler: config.c_compiler.clone(),
        stderr: err.to_string(),
    })?;
    if !output.status.success() {
        return Err(CompileError::CCompiler {
            compiler: config.c_compiler.clone(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
