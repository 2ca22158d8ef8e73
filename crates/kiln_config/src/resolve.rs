//! Resolution of a [`ProjectConfig`] against a project directory.

use std::path::{Component, Path, PathBuf};

use crate::types::{ProjectConfig, StalenessMode, ToolchainConfig};

/// Concrete build roots and naming rules.
///
/// Every source maps to exactly one object and one manifest by keeping its
/// path relative to the source root, swapping the extension, and re-rooting it
/// under the object or manifest root. Two sources never share an artifact
/// because the full relative path, subdirectories included, is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Root of the source tree.
    pub source_root: PathBuf,
    /// Root of the object tree.
    pub object_root: PathBuf,
    /// Root of the dependency manifest tree.
    pub manifest_root: PathBuf,
    /// Directory receiving the linked executable.
    pub binary_root: PathBuf,
    /// Recognized source extensions, without dots.
    pub source_extensions: Vec<String>,
    /// Object file extension.
    pub object_suffix: String,
    /// Manifest file extension.
    pub manifest_suffix: String,
    /// File name of the linked executable.
    pub executable: String,
}

impl BuildLayout {
    /// Full path of a source given its path relative to the source root.
    pub fn source_path(&self, relative: &Path) -> PathBuf {
        self.source_root.join(relative)
    }

    /// Object path for a source given its path relative to the source root.
    pub fn object_path(&self, relative: &Path) -> PathBuf {
        self.object_root
            .join(relative.with_extension(&self.object_suffix))
    }

    /// Manifest path for a source given its path relative to the source root.
    pub fn manifest_path(&self, relative: &Path) -> PathBuf {
        self.manifest_root
            .join(relative.with_extension(&self.manifest_suffix))
    }

    /// Path of the linked executable.
    pub fn binary_path(&self) -> PathBuf {
        self.binary_root.join(&self.executable)
    }

    /// Returns `true` if the file's extension is a recognized source extension.
    pub fn is_source(&self, path: &Path) -> bool {
        has_extension(path, &self.source_extensions)
    }

    /// Returns `true` if the file carries the object suffix.
    pub fn is_object(&self, path: &Path) -> bool {
        has_extension(path, std::slice::from_ref(&self.object_suffix))
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|known| known == ext))
}

/// Everything the builder needs, with directories made concrete.
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    /// Build roots and naming rules.
    pub layout: BuildLayout,
    /// Compiler and flags.
    pub toolchain: ToolchainConfig,
    /// Staleness detection strategy.
    pub staleness: StalenessMode,
}

impl ProjectConfig {
    /// Resolves relative layout directories against `project_dir`.
    pub fn resolve(&self, project_dir: &Path) -> ResolvedBuild {
        let l = &self.layout;
        ResolvedBuild {
            layout: BuildLayout {
                source_root: rooted(project_dir, &l.source_dir),
                object_root: rooted(project_dir, &l.object_dir),
                manifest_root: rooted(project_dir, &l.manifest_dir),
                binary_root: rooted(project_dir, &l.binary_dir),
                source_extensions: l.source_extensions.clone(),
                object_suffix: l.object_suffix.clone(),
                manifest_suffix: l.manifest_suffix.clone(),
                executable: self.project.name.clone(),
            },
            toolchain: self.toolchain.clone(),
            staleness: self.build.staleness,
        }
    }
}

/// Joins `dir` onto `base` lexically: `.` is dropped and `..` removes the
/// previous component, so `"."` resolves to `base` and `".."` to its parent.
///
/// Symlinks are not followed.
pub(crate) fn rooted(base: &Path, dir: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in Path::new(dir).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
