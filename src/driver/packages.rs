//! Package lookup for `package!`
//!
//! A package is a directory named after it under one of the configured
//! package paths. Its `package.toml` lists the files to include, in order:
//!
//! ```toml
//! include = ["vec.oak", "string.oak"]
//! ```
//!
//! Without a manifest every `.oak` file in the directory is included,
//! sorted by path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use walkdir::WalkDir;

use super::context::CompileContext;
use crate::util::diagnostic::{codes, CompileError, Diagnostic, Result};
use crate::util::span::Location;

pub const MANIFEST_FILE: &str = "package.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    include: Vec<PathBuf>,
}

/// Files of package `name`, in inclusion order
pub fn resolve_package(
    ctx: &mut CompileContext,
    name: &str,
    location: &Location,
) -> Result<Vec<PathBuf>> {
    let dir = ctx
        .config
        .package_paths
        .iter()
        .map(|root| root.join(name))
        .find(|dir| dir.is_dir())
        .ok_or_else(|| CompileError::UnknownPackage {
            location: location.clone(),
            name: name.to_string(),
            searched: ctx
                .config
                .package_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })?;
    debug!("Package `{}` found at {}", name, dir.display());

    let files = package_files(&dir)?;
    warn_shadowed(ctx, &files, location);
    Ok(files)
}

/// Files listed by the manifest in `dir`, or every `.oak` file in it
pub fn package_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if manifest_path.is_file() {
        let text = fs::read_to_string(&manifest_path).map_err(|e| CompileError::io(&manifest_path, e))?;
        let manifest: Manifest = toml::from_str(&text).map_err(|e| {
            CompileError::io(
                &manifest_path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
            )
        })?;
        return Ok(manifest.include.into_iter().map(|f| dir.join(f)).collect());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "oak"))
        .collect();
    files.sort();
    Ok(files)
}

/// Warn when the including file's directory has a file of the same name
/// as one of the package's files
fn warn_shadowed(
    ctx: &mut CompileContext,
    files: &[PathBuf],
    location: &Location,
) {
    let Some(local_dir) = Path::new(&ctx.cursor.file).parent().map(Path::to_path_buf) else {
        return;
    };
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let local = local_dir.join(name);
        if local.is_file() && local != *file {
            ctx.warnings.push(Diagnostic::warning(
                codes::SHADOWED_PACKAGE_FILE,
                format!("{} shadows package file {}", local.display(), file.display()),
                Some(location.clone()),
            ));
        }
    }
}
