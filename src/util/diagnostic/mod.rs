//! Unified diagnostics
//!
//! Error handling and warning collection.
//!
//! # Module structure
//!
//! - [`error`] - diagnostic data structures (Diagnostic, Severity, CompileError)
//! - [`result`] - unified Result type

pub mod error;
pub mod result;

pub use error::{codes, CompileError, Diagnostic, Phase, Severity};
pub use result::{Result, ResultExt};

/// Warning collector
///
/// Warnings are logged as they are pushed and kept for the final report.
#[derive(Debug, Default)]
pub struct WarningSink {
    warnings: Vec<Diagnostic>,
}

impl WarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning
    pub fn push(
        &mut self,
        diagnostic: Diagnostic,
    ) {
        tracing::warn!("{}", diagnostic);
        self.warnings.push(diagnostic);
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Count warnings with a given code
    pub fn count(
        &self,
        code: &str,
    ) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_counts_by_code() {
        let mut sink = WarningSink::new();
        sink.push(Diagnostic::warning(codes::DUPLICATE_GENERIC, "again", None));
        sink.push(Diagnostic::warning(codes::ILLEGAL_FILE_NAME, "Bad.oak", None));
        sink.push(Diagnostic::warning(codes::DUPLICATE_GENERIC, "again", None));

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count(codes::DUPLICATE_GENERIC), 2);
        assert_eq!(sink.count(codes::LOW_COMMENT_DENSITY), 0);
    }

    #[test]
    fn test_warning_display() {
        let diag = Diagnostic::warning(codes::LOW_COMMENT_DENSITY, "few comments", None);
        assert_eq!(diag.to_string(), "warning[W0003]: few comments");
        assert!(!diag.severity.is_error());
    }
}
