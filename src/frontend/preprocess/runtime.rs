//! Macro runtime
//!
//! A full macro is a standalone Oak program. [`MacroRuntime`] is the
//! capability the expander needs from it: compile once, invoke per call
//! site. [`CachedRuntime`] is the production implementation; it keeps
//! sources and binaries under `<cache>/macros/` and talks to the outside
//! world only through a [`Host`], so its caching rules can be tested with
//! a fake filesystem and clock.
//!
//! Caching rules:
//!
//! - `<name>.oak` is rewritten only when the captured source changed
//! - `<name>.bin` is rebuilt only when missing or older than `<name>.oak`

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::util::diagnostic::CompileError;

/// A compiled macro program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroHandle {
    pub name: String,
    pub binary: PathBuf,
}

/// Macro runtime errors
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("cannot access {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("build failed: {0}")]
    Build(#[source] Box<CompileError>),

    #[error("could not launch `{command}`: {source}")]
    Launch { command: String, source: io::Error },

    #[error("exited with status {status}: {stderr}")]
    Exit { status: i32, stderr: String },
}

/// Compile and run macro programs
pub trait MacroRuntime {
    /// Make `source` available as a runnable program named `name`
    fn compile(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<MacroHandle, RuntimeError>;

    /// Run a compiled macro, returning its standard output
    fn invoke(
        &mut self,
        handle: &MacroHandle,
        args: &[String],
    ) -> Result<String, RuntimeError>;
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status; `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Filesystem, process and recursive-compile services
pub trait Host {
    /// Modification time, `None` when the file does not exist
    fn mtime(
        &self,
        path: &Path,
    ) -> Option<SystemTime>;

    fn read_to_string(
        &self,
        path: &Path,
    ) -> io::Result<String>;

    fn write(
        &mut self,
        path: &Path,
        contents: &str,
    ) -> io::Result<()>;

    /// Run a shell command line
    fn run_process(
        &mut self,
        command: &str,
    ) -> io::Result<ProcessOutput>;

    /// Compile the Oak program at `source` into an executable at `binary`
    fn build_program(
        &mut self,
        source: &Path,
        binary: &Path,
    ) -> Result<(), CompileError>;
}

/// Quote one shell argument in double quotes, escaping `\`, `"`, `$`
/// and backticks
pub fn quote_arg(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Full command line for invoking `binary` with `args`
pub fn command_line(
    binary: &Path,
    args: &[String],
) -> String {
    let mut cmd = quote_arg(&binary.to_string_lossy());
    for arg in args {
        cmd.push(' ');
        cmd.push_str(&quote_arg(arg));
    }
    cmd
}

/// Disk-cached macro runtime
#[derive(Debug)]
pub struct CachedRuntime<H: Host> {
    host: H,
    dir: PathBuf,
    builds: usize,
}

impl<H: Host> CachedRuntime<H> {
    pub fn new(
        host: H,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host,
            dir: dir.into(),
            builds: 0,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Number of macro programs built by this runtime
    pub fn builds(&self) -> usize {
        self.builds
    }

    fn source_path(
        &self,
        name: &str,
    ) -> PathBuf {
        self.dir.join(format!("{}.oak", name))
    }

    fn binary_path(
        &self,
        name: &str,
    ) -> PathBuf {
        self.dir.join(format!("{}.bin", name))
    }

    fn is_stale(
        &self,
        source: &Path,
        binary: &Path,
    ) -> bool {
        match (self.host.mtime(binary), self.host.mtime(source)) {
            (Some(built), Some(written)) => built < written,
            _ => true,
        }
    }
}

impl<H: Host> MacroRuntime for CachedRuntime<H> {
    fn compile(
        &mut self,
        name: &str,
        source: &str,
    ) -> Result<MacroHandle, RuntimeError> {
        let source_path = self.source_path(name);
        let binary = self.binary_path(name);

        let unchanged = self
            .host
            .read_to_string(&source_path)
            .is_ok_and(|existing| existing == source);
        if !unchanged {
            debug!("Writing macro source {}", source_path.display());
            self.host
                .write(&source_path, source)
                .map_err(|source| RuntimeError::Io {
                    path: source_path.clone(),
                    source,
                })?;
        }

        if !unchanged || self.is_stale(&source_path, &binary) {
            info!("Building macro `{}`", name);
            self.host
                .build_program(&source_path, &binary)
                .map_err(|err| RuntimeError::Build(Box::new(err)))?;
            self.builds += 1;
        } else {
            debug!("Reusing cached macro `{}`", name);
        }

        Ok(MacroHandle {
            name: name.to_string(),
            binary,
        })
    }

    fn invoke(
        &mut self,
        handle: &MacroHandle,
        args: &[String],
    ) -> Result<String, RuntimeError> {
        let command = command_line(&handle.binary, args);
        debug!("Invoking macro `{}`: {}", handle.name, command);

        let output = self
            .host
            .run_process(&command)
            .map_err(|source| RuntimeError::Launch {
                command: command.clone(),
                source,
            })?;

        if !output.success() {
            return Err(RuntimeError::Exit {
                status: output.status.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}
