//! Content-hash bookkeeping for the opt-in content-hash staleness mode.
//!
//! The default build decides staleness from modification times alone. When a
//! project selects `staleness = "content-hash"`, the builder records the hash
//! of every dependency listed in a source's manifest after each successful
//! compile, and later compares current hashes against that record.

#![warn(missing_docs)]

pub mod error;
pub mod hash;
pub mod hasher;
pub mod ledger;

pub use error::CacheError;
pub use hash::ContentHash;
pub use hasher::SourceHasher;
pub use ledger::{HashLedger, LedgerEntry};

/// Version stamp written into the ledger. A ledger written by another
/// version is discarded on load.
pub const KILN_VERSION: &str = env!("CARGO_PKG_VERSION");
