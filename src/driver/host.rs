//! Operating system services for the macro runtime

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::SystemTime;

use super::build::build_program;
use crate::frontend::preprocess::{Host, ProcessOutput};
use crate::util::config::CompilerConfig;
use crate::util::diagnostic::CompileError;

/// Real filesystem and processes; macro programs are built with the
/// configuration of the compilation that defined them
#[derive(Debug, Clone)]
pub struct OsHost {
    config: CompilerConfig,
}

impl OsHost {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }
}

impl Host for OsHost {
    fn mtime(
        &self,
        path: &Path,
    ) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn read_to_string(
        &self,
        path: &Path,
    ) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(
        &mut self,
        path: &Path,
        contents: &str,
    ) -> io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, contents)
    }

    fn run_process(
        &mut self,
        command: &str,
    ) -> io::Result<ProcessOutput> {
        let output = Command::new("sh").arg("-c").arg(command).output()?;
        Ok(ProcessOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn build_program(
        &mut self,
        source: &Path,
        binary: &Path,
    ) -> Result<(), CompileError> {
        build_program(&self.config.for_macro(), &[source.to_path_buf()], binary).map(|_| ())
    }
}
