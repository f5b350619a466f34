//! Style constraints
//!
//! Checked for every translated file unless compiling a macro program or
//! running with `--no-constraints`. Violations are warnings.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::context::CompileContext;
use crate::util::diagnostic::{codes, Diagnostic};

static FILE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9_]+(\.[a-z0-9_]+)*\.oak$").expect("file name pattern compiles"));

/// Whether a file name follows the naming convention
pub fn is_legal_file_name(name: &str) -> bool {
    FILE_NAME.is_match(name)
}

/// Fraction of non-blank lines that carry a comment
pub fn comment_density(source: &str) -> f64 {
    let mut lines = 0usize;
    let mut commented = 0usize;
    let mut in_block = false;
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        lines += 1;
        let has_comment = in_block || trimmed.contains("//") || trimmed.contains("/*");
        if has_comment {
            commented += 1;
        }
        if trimmed.contains("/*") {
            in_block = true;
        }
        if trimmed.contains("*/") {
            in_block = false;
        }
    }
    if lines == 0 {
        1.0
    } else {
        commented as f64 / lines as f64
    }
}

/// Check `path` and its contents, recording warnings in the context
pub fn check_file(
    ctx: &mut CompileContext,
    path: &Path,
    source: &str,
) {
    let location = Some(ctx.location());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !is_legal_file_name(&name) {
        ctx.warnings.push(Diagnostic::warning(
            codes::ILLEGAL_FILE_NAME,
            format!("file name `{}` should be lowercase letters, digits and underscores", name),
            location.clone(),
        ));
    }

    let density = comment_density(source);
    if density < ctx.config.comment_density {
        ctx.warnings.push(Diagnostic::warning(
            codes::LOW_COMMENT_DENSITY,
            format!(
                "{} has a comment density of {:.1}%, below {:.1}%",
                name,
                density * 100.0,
                ctx.config.comment_density * 100.0
            ),
            location,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert!(is_legal_file_name("main.oak"));
        assert!(is_legal_file_name("std_io.v2.oak"));
        assert!(!is_legal_file_name("Main.oak"));
        assert!(!is_legal_file_name("my-file.oak"));
        assert!(!is_legal_file_name("main.c"));
    }

    #[test]
    fn test_comment_density() {
        let source = "// header\nlet main() -> i32 {\n    return 0;\n}\n";
        assert!((comment_density(source) - 0.25).abs() < f64::EPSILON);
        assert_eq!(comment_density(""), 1.0);

        let block = "/* a\n   b */\nlet x: i32;\n";
        assert!((comment_density(block) - 2.0 / 3.0).abs() < 1e-9);
    }
}
