//! Failure dumps
//!
//! When a file fails to translate, the phase, the error and the tokens as
//! they stood at that point are written to `<cache>/dumps/<stem>.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::frontend::lexer::Token;
use crate::util::diagnostic::{CompileError, Phase};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureDump {
    pub file: String,
    pub phase: String,
    pub error: String,
    pub tokens: Vec<String>,
}

impl FailureDump {
    pub fn new(
        file: &str,
        phase: Phase,
        error: &CompileError,
        tokens: &[Token],
    ) -> Self {
        Self {
            file: file.to_string(),
            phase: phase.to_string(),
            error: error.to_string(),
            tokens: tokens.iter().map(|t| t.text.clone()).collect(),
        }
    }
}

/// Write `dump` under `dir`, returning the path written
pub fn write_dump(
    dir: &Path,
    dump: &FailureDump,
) -> io::Result<PathBuf> {
    let stem = Path::new(&dump.file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.json", stem));
    let json = serde_json::to_string_pretty(dump).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::span::Location;

    #[test]
    fn test_dump_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompileError::sequence(Location::default(), "unexpected `}`");
        let tokens = vec![Token::bare("let"), Token::bare("x")];
        let dump = FailureDump::new("src/main.oak", Phase::Sequencing, &err, &tokens);

        let path = write_dump(dir.path(), &dump).unwrap();
        assert_eq!(path, dir.path().join("main.json"));

        let read: FailureDump = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, dump);
        assert_eq!(read.phase, "sequencing");
        assert_eq!(read.tokens, vec!["let", "x"]);
    }
}
