//! Error types for the build pipeline.

use std::path::PathBuf;

use kiln_cache::CacheError;

/// Errors produced while discovering, compiling or linking.
///
/// Per-source compile failures do not surface one by one; they are collected
/// and reported together as [`BuildError::CompileFailed`] once every source has
/// been attempted.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Walking a directory tree failed. Aborts the build.
    #[error("failed to scan {path}: {source}")]
    Discovery {
        /// Directory or entry being listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The source root contained no recognized source files.
    #[error("no source files found in {root}")]
    NoSources {
        /// The source root that was scanned.
        root: PathBuf,
    },

    /// A dependency manifest line has no `:` separator.
    #[error("malformed dependency manifest {path}: no ':' in line '{line}'")]
    ManifestParse {
        /// The manifest file, or empty when parsing in-memory text.
        path: PathBuf,
        /// The offending line after continuation folding.
        line: String,
    },

    /// A filesystem operation (metadata, directory creation, read) failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The compiler or linker could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// One or more sources failed to compile, so nothing was linked.
    #[error("object compilation failed for {} source(s): {}", .failed.len(), list(.failed))]
    CompileFailed {
        /// Sources (relative to the source root) whose compile exited non-zero.
        failed: Vec<PathBuf>,
    },

    /// The linker exited non-zero.
    #[error("linking {binary} failed with exit code {exit_code}")]
    LinkFailed {
        /// The executable that was being produced.
        binary: PathBuf,
        /// The linker's exit code (`-1` if killed by a signal).
        exit_code: i32,
    },

    /// The content-hash ledger could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl BuildError {
    /// Wraps an I/O error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
