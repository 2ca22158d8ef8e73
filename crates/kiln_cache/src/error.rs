//! Error types for hash ledger operations.

use std::path::PathBuf;

/// Errors that can occur while hashing files or persisting the ledger.
///
/// Loading is fail-safe and never produces these; a missing or corrupt
/// ledger is treated as empty, which marks every source stale.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading a dependency or writing the ledger.
    #[error("hash ledger I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The ledger could not be encoded as JSON.
    #[error("failed to serialize hash ledger: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
