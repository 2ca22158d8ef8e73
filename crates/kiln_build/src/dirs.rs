//! Directory materialization for the mirrored build trees.

use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// Makes sure `path` exists as a directory, creating missing ancestors
/// root-to-leaf.
///
/// Returns the directories actually created, in creation order, and logs one
/// event per directory. An empty path or an existing directory is a no-op.
pub fn ensure_dir(path: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut missing: Vec<&Path> = path
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.is_dir())
        .collect();
    missing.reverse();

    let mut created = Vec::with_capacity(missing.len());
    for dir in missing {
        match std::fs::create_dir(dir) {
            Ok(()) => {
                log::info!("Creating directory {}", dir.display());
                created.push(dir.to_path_buf());
            }
            // Lost a race with another creator; the directory is there now.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(e) => return Err(BuildError::io(dir, e)),
        }
    }
    Ok(created)
}

/// Materializes the parent directory of a file path.
pub fn ensure_parent(file: &Path) -> Result<Vec<PathBuf>, BuildError> {
    match file.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(Vec::new()),
    }
}
