//! Persistent record of dependency hashes at each source's last compile.
//!
//! The ledger lives as `ledger.json` in the manifest root. It is rewritten
//! after every build that ran in content-hash mode.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CacheError;
use crate::hash::ContentHash;

/// Name of the ledger file within the manifest root.
pub const LEDGER_FILE: &str = "ledger.json";

/// Dependency hashes recorded for every source compiled in content-hash mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashLedger {
    /// Kiln version that wrote this ledger.
    pub kiln_version: String,

    /// Per-source entries, keyed by path relative to the source root.
    pub sources: BTreeMap<PathBuf, LedgerEntry>,
}

/// Hashes of every dependency a source's manifest listed when it was last
/// compiled successfully. The source itself is among them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Dependency path (as written in the manifest) to content hash.
    pub dependencies: BTreeMap<PathBuf, ContentHash>,
}

impl HashLedger {
    /// Creates an empty ledger stamped with `kiln_version`.
    pub fn new(kiln_version: &str) -> Self {
        Self {
            kiln_version: kiln_version.to_string(),
            sources: BTreeMap::new(),
        }
    }

    /// Loads the ledger from `manifest_root`, returning `None` if it is
    /// missing or unparsable.
    pub fn load(manifest_root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(manifest_root.join(LEDGER_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Loads a compatible ledger or starts an empty one.
    pub fn load_or_create(manifest_root: &Path, kiln_version: &str) -> Self {
        Self::load(manifest_root)
            .filter(|l| l.kiln_version == kiln_version)
            .unwrap_or_else(|| Self::new(kiln_version))
    }

    /// Writes the ledger into `manifest_root`, creating the directory if needed.
    pub fn save(&self, manifest_root: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(manifest_root).map_err(|e| CacheError::Io {
            path: manifest_root.to_path_buf(),
            source: e,
        })?;
        let path = manifest_root.join(LEDGER_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns the entry recorded for `source`, if any.
    pub fn entry(&self, source: &Path) -> Option<&LedgerEntry> {
        self.sources.get(source)
    }

    /// Replaces the entry for `source`.
    pub fn record(&mut self, source: &Path, dependencies: BTreeMap<PathBuf, ContentHash>) {
        self.sources
            .insert(source.to_path_buf(), LedgerEntry { dependencies });
    }

    /// Drops the entry for `source`, so its next check reports stale.
    pub fn forget(&mut self, source: &Path) {
        self.sources.remove(source);
    }
}
