//! Parser for compiler-emitted dependency manifests (`-MMD` depfiles).
//!
//! A manifest holds one or more make-style rules:
//!
//! ```text
//! obj/sub/a.o: src/sub/a.cc src/b.h \
//!  src/c.h
//! ```
//!
//! A backslash immediately followed by a newline continues the rule on the
//! next line. The dependency lists of all rules are concatenated in order,
//! duplicates included.

use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// Parses manifest text into its ordered dependency list.
///
/// Fails with [`BuildError::ManifestParse`] on a non-blank line without a
/// `:` separator.
pub fn parse_dependencies(text: &str) -> Result<Vec<String>, BuildError> {
    parse_with_origin(text, Path::new(""))
}

/// Reads a manifest from disk and resolves each dependency against
/// `work_dir`, the directory the compiler ran in.
///
/// Absolute dependency paths are returned unchanged.
pub fn read_dependencies(manifest: &Path, work_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let text = std::fs::read_to_string(manifest).map_err(|e| BuildError::io(manifest, e))?;
    Ok(parse_with_origin(&text, manifest)?
        .into_iter()
        .map(|dep| work_dir.join(dep))
        .collect())
}

fn parse_with_origin(text: &str, origin: &Path) -> Result<Vec<String>, BuildError> {
    let folded = text.replace("\\\r\n", "").replace("\\\n", "");
    let mut deps = Vec::new();
    for line in folded.lines().filter(|l| !l.trim().is_empty()) {
        let (_target, prerequisites) =
            line.split_once(':')
                .ok_or_else(|| BuildError::ManifestParse {
                    path: origin.to_path_buf(),
                    line: line.to_string(),
                })?;
        deps.extend(prerequisites.split_whitespace().map(String::from));
    }
    Ok(deps)
}
