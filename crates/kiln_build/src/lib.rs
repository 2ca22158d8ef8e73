//! Incremental compile-and-link orchestration.
//!
//! Sources under the source root are compiled one by one into a mirrored
//! object tree, each alongside a compiler-written dependency manifest in a
//! mirrored manifest tree. A source is recompiled only when its object or
//! manifest is missing or older than something it depends on. Once every
//! source compiled, all objects are linked into a single executable.

#![warn(missing_docs)]

pub mod compile;
pub mod depfile;
pub mod dirs;
pub mod discover;
pub mod driver;
pub mod error;
pub mod staleness;
pub mod toolchain;

#[cfg(test)]
mod testing;

pub use compile::{CompileOutcome, Compiler};
pub use depfile::{parse_dependencies, read_dependencies};
pub use dirs::ensure_dir;
pub use discover::{discover_objects, discover_sources, list_files_recursive, SourceFile};
pub use driver::{BuildReport, Builder};
pub use error::BuildError;
pub use staleness::{needs_build, Inputs, Staleness};
pub use toolchain::{CommandToolchain, CompileRequest, LinkRequest, Toolchain};
