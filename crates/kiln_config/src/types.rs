//! Configuration types deserialized from `kiln.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level configuration parsed from `kiln.toml`.
///
/// Only `[project]` is required; every other section falls back to defaults
/// that build `src/` with `g++` into `obj/` and `.d/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata (output executable name).
    pub project: ProjectMeta,
    /// Compiler and flag settings.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Build root directories and file suffixes.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Rebuild-decision settings.
    #[serde(default)]
    pub build: BuildSettings,
}

impl ProjectConfig {
    /// Creates a configuration with every section defaulted and the given
    /// executable name. Used when a project has no `kiln.toml`.
    pub fn named(name: &str) -> Self {
        Self {
            project: ProjectMeta {
                name: name.to_string(),
            },
            toolchain: ToolchainConfig::default(),
            layout: LayoutConfig::default(),
            build: BuildSettings::default(),
        }
    }
}

/// Project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// Name of the linked executable.
    pub name: String,
}

/// The external compiler and the flags passed to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler driver used for both compiling and linking.
    pub compiler: String,
    /// Flags for every compile step (language standard, warnings, optimization).
    #[serde(deserialize_with = "deserialize_flags")]
    pub compile_flags: Vec<String>,
    /// Include and library search flags, passed to every compile step.
    #[serde(deserialize_with = "deserialize_flags")]
    pub include_flags: Vec<String>,
    /// Flags appended to the link step (libraries).
    #[serde(deserialize_with = "deserialize_flags")]
    pub link_flags: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            compile_flags: vec!["-std=c++14".to_string(), "-Wall".to_string()],
            include_flags: Vec::new(),
            link_flags: Vec::new(),
        }
    }
}

/// The four parallel build roots and the suffixes that tie them together.
///
/// Relative directories are resolved against the project directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Root of the source tree.
    pub source_dir: String,
    /// Root of the object tree.
    pub object_dir: String,
    /// Root of the dependency manifest tree.
    pub manifest_dir: String,
    /// Directory receiving the linked executable.
    pub binary_dir: String,
    /// Extensions (without the dot) that mark a file as a source.
    pub source_extensions: Vec<String>,
    /// Extension given to object files.
    pub object_suffix: String,
    /// Extension given to dependency manifests.
    pub manifest_suffix: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            object_dir: "obj".to_string(),
            manifest_dir: ".d".to_string(),
            binary_dir: ".".to_string(),
            source_extensions: ["c", "cc", "cpp"].map(String::from).to_vec(),
            object_suffix: "o".to_string(),
            manifest_suffix: "d".to_string(),
        }
    }
}

/// Settings that influence the rebuild decision.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// How staleness is detected.
    pub staleness: StalenessMode,
}

/// Strategy for deciding whether an object is out of date.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StalenessMode {
    /// Compare modification times (default).
    ///
    /// Clock skew between machines or coarse filesystem timestamps can hide
    /// an edit or trigger a spurious rebuild; ties count as stale.
    #[default]
    Mtime,
    /// Compare content hashes recorded at the last successful compile.
    ContentHash,
}

/// Deserializes a flag list given either as one whitespace-separated string
/// or as a list of individual arguments.
///
/// `compile_flags = "-std=c++14 -Wall"` and
/// `compile_flags = ["-std=c++14", "-Wall"]` produce the same value. Use the
/// list form for arguments that contain spaces.
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Flags;

    impl<'de> Visitor<'de> for Flags {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a flag string or a list of flags")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.split_whitespace().map(String::from).collect())
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut flags = Vec::new();
            while let Some(flag) = seq.next_element::<String>()? {
                flags.push(flag);
            }
            Ok(flags)
        }
    }

    deserializer.deserialize_any(Flags)
}
