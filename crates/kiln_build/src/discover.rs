//! Recursive discovery of sources and object artifacts.

use std::path::{Path, PathBuf};

use kiln_config::BuildLayout;

use crate::error::BuildError;

/// A source file, identified by its path relative to the source root.
///
/// Rediscovered on every build; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Path relative to the source root, subdirectories included.
    pub relative: PathBuf,
}

/// Lists every file (not directory) below `root`.
///
/// The result is sorted so logs and link lines are stable across runs;
/// nothing downstream depends on the order.
pub fn list_files_recursive(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut files = Vec::new();
    walk_dir(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), BuildError> {
    let scan_err = |source| BuildError::Discovery {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if path.is_dir() {
            walk_dir(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Finds every recognized source below the layout's source root.
pub fn discover_sources(layout: &BuildLayout) -> Result<Vec<SourceFile>, BuildError> {
    let root = &layout.source_root;
    Ok(list_files_recursive(root)?
        .into_iter()
        .filter(|path| layout.is_source(path))
        .filter_map(|path| {
            path.strip_prefix(root).ok().map(|rel| SourceFile {
                relative: rel.to_path_buf(),
            })
        })
        .collect())
}

/// Finds every object artifact below the layout's object root.
///
/// Objects left behind by deleted sources are included, like any other file
/// carrying the object suffix.
pub fn discover_objects(layout: &BuildLayout) -> Result<Vec<PathBuf>, BuildError> {
    Ok(list_files_recursive(&layout.object_root)?
        .into_iter()
        .filter(|path| layout.is_object(path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::ProjectConfig;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn lists_files_in_nested_dirs_only() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.cc"));
        touch(&dir.path().join("world/map/Map.cc"));
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();

        let files = list_files_recursive(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.cc"), dir.path().join("world/map/Map.cc")]
        );
    }

    #[test]
    fn missing_root_is_discovery_error() {
        let err = list_files_recursive(Path::new("/nonexistent/kiln/src")).unwrap_err();
        assert!(matches!(err, BuildError::Discovery { .. }));
    }

    #[test]
    fn sources_are_filtered_and_relative() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectConfig::named("app").resolve(dir.path()).layout;
        touch(&layout.source_root.join("main.cc"));
        touch(&layout.source_root.join("util.c"));
        touch(&layout.source_root.join("render/Sprite.cpp"));
        touch(&layout.source_root.join("render/Sprite.hh"));
        touch(&layout.source_root.join("notes.txt"));

        let sources = discover_sources(&layout).unwrap();
        let rel: Vec<_> = sources.iter().map(|s| s.relative.clone()).collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("main.cc"),
                PathBuf::from("render/Sprite.cpp"),
                PathBuf::from("util.c"),
            ]
        );
    }

    #[test]
    fn objects_skip_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectConfig::named("app").resolve(dir.path()).layout;
        touch(&layout.object_root.join("a.o"));
        touch(&layout.object_root.join("sub/a.o"));
        touch(&layout.object_root.join("sub/.keep"));

        let objects = discover_objects(&layout).unwrap();
        assert_eq!(
            objects,
            vec![layout.object_root.join("a.o"), layout.object_root.join("sub/a.o")]
        );
    }
}
