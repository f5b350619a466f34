//! Acorn configuration system
//!
//! Project-level configuration merged under command line overrides.
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high -> low):
//! 1. CLI arguments
//! 2. Project-level (acorn.toml)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use acorn::util::config::{load_project_config, CompilerConfig};
//!
//! let config = load_project_config(std::path::Path::new(".")).unwrap();
//! assert_eq!(config.c_compiler, CompilerConfig::default().c_compiler);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "acorn.toml";

/// Compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Directory for generated C, compiled macros and dumps
    pub cache_dir: PathBuf,
    /// C compiler used for the final build and for macro programs
    pub c_compiler: String,
    /// Extra flags handed to the C compiler
    pub c_flags: Vec<String>,
    /// Directories searched by `package!`
    pub package_paths: Vec<PathBuf>,
    /// Output executable name
    pub output: PathBuf,
    /// Stop after writing the C translation unit
    pub emit_only: bool,
    /// Macro mode: suppresses style constraints (set for macro programs)
    pub macro_mode: bool,
    /// Enforce the file naming and comment density style checks
    pub style_checks: bool,
    /// Write a dump file when a source file fails to translate
    pub dump_on_error: bool,
    /// Minimum fraction of commented lines before a warning is raised
    pub comment_density: f64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".oak_build"),
            c_compiler: default_c_compiler(),
            c_flags: Vec::new(),
            package_paths: default_package_paths(),
            output: PathBuf::from("a.out"),
            emit_only: false,
            macro_mode: false,
            style_checks: true,
            dump_on_error: true,
            comment_density: 0.05,
        }
    }
}

fn default_c_compiler() -> String {
    std::env::var("CC").unwrap_or_else(|_| "cc".to_string())
}

fn default_package_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/usr/include/oak")];
    if let Ok(home) = std::env::var("HOME") {
        paths.push(PathBuf::from(home).join(".oak").join("packages"));
    }
    paths
}

impl CompilerConfig {
    /// Whether style checks run for this compilation
    pub fn checks_style(&self) -> bool {
        self.style_checks && !self.macro_mode
    }

    /// Configuration used for compiling a macro program
    pub fn for_macro(&self) -> Self {
        Self {
            macro_mode: true,
            emit_only: false,
            ..self.clone()
        }
    }

    /// Directory holding compiled macro programs
    pub fn macro_dir(&self) -> PathBuf {
        self.cache_dir.join("macros")
    }

    /// Directory holding failure dumps
    pub fn dump_dir(&self) -> PathBuf {
        self.cache_dir.join("dumps")
    }

    /// Path of the generated C translation unit
    pub fn c_output(&self) -> PathBuf {
        let stem = self
            .output
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        self.cache_dir.join(format!("{}.c", stem))
    }
}

/// Load the project config from `dir`, returning defaults when absent
pub fn load_project_config(dir: &Path) -> Result<CompilerConfig, ConfigError> {
    let path = dir.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(CompilerConfig::default());
    }

    let content = fs::read_to_string(&path).map_err(ConfigError::IoError)?;
    parse_config(&content)
}

/// Parse a TOML configuration document
pub fn parse_config(content: &str) -> Result<CompilerConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::ParseError)
}

/// Save a configuration as `acorn.toml` in `dir`
pub fn save_project_config(
    dir: &Path,
    config: &CompilerConfig,
) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config).map_err(ConfigError::SerializeError)?;
    fs::write(dir.join(PROJECT_CONFIG_FILE), content).map_err(ConfigError::IoError)?;
    Ok(())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Config serialize error: {0}")]
    SerializeError(toml::ser::Error),
}
