//! Dependency hashing and comparison against the ledger.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::hash::ContentHash;
use crate::ledger::LedgerEntry;

/// Utility for hashing dependency files and spotting content changes.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the content hash of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let io_err = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        ContentHash::from_reader(BufReader::new(file)).map_err(io_err)
    }

    /// Hashes every listed dependency, failing on the first unreadable file.
    ///
    /// Duplicate paths collapse into a single entry.
    pub fn hash_all(paths: &[PathBuf]) -> Result<BTreeMap<PathBuf, ContentHash>, CacheError> {
        let mut hashes = BTreeMap::new();
        for path in paths {
            if !hashes.contains_key(path) {
                hashes.insert(path.clone(), Self::hash_file(path)?);
            }
        }
        Ok(hashes)
    }

    /// Returns the first dependency whose current content differs from the
    /// recorded entry, or `None` when every dependency still matches.
    ///
    /// A dependency absent from the entry, or one that can no longer be read,
    /// counts as changed.
    pub fn first_change(entry: &LedgerEntry, dependencies: &[PathBuf]) -> Option<PathBuf> {
        dependencies
            .iter()
            .find(|dep| match entry.dependencies.get(*dep) {
                Some(recorded) => Self::hash_file(dep).map_or(true, |now| now != *recorded),
                None => true,
            })
            .cloned()
    }
}
