//! Diagnostic data structures
//!
//! Fatal problems are [`CompileError`] values propagated with `?`; every
//! error aborts the file being translated and is wrapped with file and
//! phase context by the driver as it travels up through includes.
//! Non-fatal problems are [`Diagnostic`] warnings collected on the
//! compilation context.

use std::fmt;
use std::path::PathBuf;

use crate::frontend::lexer::LexError;
use crate::frontend::types::TypeError;
use crate::util::span::Location;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Check whether this is an error level
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Warning codes
pub mod codes {
    /// File name breaks the naming convention
    pub const ILLEGAL_FILE_NAME: &str = "W0001";
    /// A local file shadows a file of the same name inside a package
    pub const SHADOWED_PACKAGE_FILE: &str = "W0002";
    /// Too few comments in a file
    pub const LOW_COMMENT_DENSITY: &str = "W0003";
    /// A generic with an identical shape was registered again
    pub const DUPLICATE_GENERIC: &str = "W0004";
}

/// A non-fatal diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Diagnostic code
    pub code: &'static str,
    /// Rendered message
    pub message: String,
    /// Where it happened, if known
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a warning
    pub fn warning(
        code: &'static str,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}[{}]: {}: {}", self.severity, self.code, loc, self.message),
            None => write!(f, "{}[{}]: {}", self.severity, self.code, self.message),
        }
    }
}

/// Translation phase, used to give errors context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reading,
    Lexing,
    Preprocessing,
    Rules,
    Operators,
    Sequencing,
    Emitting,
}

impl fmt::Display for Phase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Phase::Reading => write!(f, "reading"),
            Phase::Lexing => write!(f, "lexing"),
            Phase::Preprocessing => write!(f, "macro expansion"),
            Phase::Rules => write!(f, "rule application"),
            Phase::Operators => write!(f, "operator substitution"),
            Phase::Sequencing => write!(f, "sequencing"),
            Phase::Emitting => write!(f, "C emission"),
        }
    }
}

/// Fatal compilation errors
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{location}: malformed macro: {message}")]
    MalformedMacro { location: Location, message: String },

    #[error("{location}: `{name}` is already defined as a {existing}")]
    NameCollision {
        location: Location,
        name: String,
        existing: &'static str,
    },

    #[error("{location}: unknown preprocessor token `{name}`")]
    UnknownPreprocToken { location: Location, name: String },

    #[error("{location}: unknown macro `{name}!`")]
    UnknownMacro { location: Location, name: String },

    #[error("{location}: macro `{name}` failed: {message}")]
    MacroFailed {
        location: Location,
        name: String,
        message: String,
    },

    #[error("unknown rule engine `{engine}` for rule `{rule}`")]
    UnknownEngine { rule: String, engine: String },

    #[error("{location}: unknown rule `{name}`")]
    UnknownRule { location: Location, name: String },

    #[error("{location}: package `{name}` not found in {searched}")]
    UnknownPackage {
        location: Location,
        name: String,
        searched: String,
    },

    #[error("{location}: {message}")]
    Operator { location: Location, message: String },

    #[error("{location}: {source}")]
    Type { location: Location, source: TypeError },

    #[error("{location}: {message}")]
    Sequence { location: Location, message: String },

    #[error("{location}: no viable candidate to instantiate `{name}`:\n{reasons}")]
    NoViableCandidate {
        location: Location,
        name: String,
        reasons: String,
    },

    #[error("{location}: cannot instantiate `{name}`: {message}")]
    Instantiation {
        location: Location,
        name: String,
        message: String,
    },

    #[error("{location}: post-condition of `{name}` failed: {source}")]
    PostCondition {
        location: Location,
        name: String,
        source: Box<CompileError>,
    },

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },

    #[error("C compiler `{compiler}` failed: {stderr}")]
    CCompiler { compiler: String, stderr: String },

    #[error("in {file} during {phase}: {source}")]
    InFile {
        file: String,
        phase: Phase,
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Shorthand for a sequencing error
    pub fn sequence(
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        CompileError::Sequence {
            location,
            message: message.into(),
        }
    }

    /// Shorthand for an IO error on a path
    pub fn io(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }

    /// Innermost error, with all file context stripped
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::InFile { source, .. } => source.root(),
            other => other,
        }
    }

    /// Files the error travelled through, innermost last
    pub fn file_trail(&self) -> Vec<&str> {
        let mut trail = Vec::new();
        let mut current = self;
        while let CompileError::InFile { file, source, .. } = current {
            trail.push(file.as_str());
            current = source;
        }
        trail
    }
}
