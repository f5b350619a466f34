//! Unified Result type
//!
//! Every phase returns [`Result`]; the driver attaches file context with
//! [`ResultExt::in_file`] as failures cross include boundaries.

use super::error::{CompileError, Phase};

/// Unified result type
pub type Result<T, E = CompileError> = std::result::Result<T, E>;

/// Result extension
pub trait ResultExt<T> {
    /// Wrap an error with the file and phase it happened in
    fn in_file(
        self,
        file: &str,
        phase: Phase,
    ) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_file(
        self,
        file: &str,
        phase: Phase,
    ) -> Result<T> {
        self.map_err(|err| CompileError::InFile {
            file: file.to_string(),
            phase,
            source: Box::new(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::span::Location;

    #[test]
    fn test_in_file_nests_context() {
        let inner: Result<()> = Err(CompileError::sequence(Location::default(), "boom"));
        let err = inner
            .in_file("b.oak", Phase::Sequencing)
            .in_file("a.oak", Phase::Preprocessing)
            .unwrap_err();

        assert_eq!(err.file_trail(), vec!["a.oak", "b.oak"]);
        assert!(matches!(err.root(), CompileError::Sequence { .. }));
        let text = err.to_string();
        assert!(text.starts_with("in a.oak during macro expansion"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_ok_passes_through() {
        let ok: Result<u8> = Ok(3);
        assert_eq!(ok.in_file("x.oak", Phase::Lexing).unwrap(), 3);
    }
}
