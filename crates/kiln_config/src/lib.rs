//! Parsing and validation of `kiln.toml` build configuration files.
//!
//! This crate reads the project configuration and produces a strongly-typed
//! [`ProjectConfig`], then resolves it against a project directory into the
//! concrete [`BuildLayout`] and toolchain settings the builder runs with.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{BuildLayout, ResolvedBuild};
pub use types::*;
