//! Source location tracking

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source position (1-indexed line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new position
    #[inline]
    pub fn new(
        line: usize,
        column: usize,
    ) -> Self {
        Self { line, column }
    }

    /// Create a dummy position for synthesized tokens
    #[inline]
    pub fn dummy() -> Self {
        Self { line: 0, column: 0 }
    }

    /// Check if this is a dummy position
    #[inline]
    pub fn is_dummy(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Position {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Shared, cheaply clonable source file name.
///
/// Every token carries one, so re-lexed macro output and generic bodies
/// keep pointing at the file they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(Arc<str>);

impl FileName {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn from_path(path: &Path) -> Self {
        Self::new(&path.display().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&*self.0)
    }
}

impl Default for FileName {
    fn default() -> Self {
        Self::new("<unknown>")
    }
}

impl fmt::Display for FileName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position inside a named file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub file: FileName,
    pub pos: Position,
}

impl Location {
    pub fn new(
        file: FileName,
        pos: Position,
    ) -> Self {
        Self { file, pos }
    }
}

impl fmt::Display for Location {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        let pos = Position::new(10, 20);
        assert_eq!(format!("{}", pos), "10:20");
    }

    #[test]
    fn test_position_dummy() {
        let pos = Position::dummy();
        assert!(pos.is_dummy());
        assert!(!Position::new(1, 1).is_dummy());
    }

    #[test]
    fn test_location_display() {
        let loc = Location::new(FileName::new("main.oak"), Position::new(3, 7));
        assert_eq!(loc.to_string(), "main.oak:3:7");
    }

    #[test]
    fn test_file_name_is_shared() {
        let a = FileName::new("lib.oak");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.as_str(), "lib.oak");
    }
}
