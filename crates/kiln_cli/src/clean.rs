//! `kiln clean`: remove generated artifacts.

use std::path::{Path, PathBuf};

use kiln_config::BuildLayout;

use crate::project::{load_project, resolve_project_root};
use crate::GlobalArgs;

/// Runs the `kiln clean` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_project(&project_dir, global)?;
    let resolved = config.resolve(&project_dir);

    if !global.quiet {
        eprintln!("   Cleaning {}", config.project.name);
    }
    let removed = clean_layout(&resolved.layout, &project_dir)?;
    if !global.quiet {
        eprintln!("    Removed {} path(s)", removed.len());
    }
    Ok(0)
}

/// Deletes the object tree, the manifest tree and the executable.
///
/// A root that is or contains the project directory or the source root is
/// left alone. Paths are compared after resolving symlinks and `..`.
/// Returns the paths actually removed.
pub fn clean_layout(layout: &BuildLayout, project_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for root in [&layout.object_root, &layout.manifest_root] {
        if !removable_root(root, layout, project_dir) {
            log::warn!(
                "not removing {}: it contains the project or its sources",
                root.display()
            );
            continue;
        }
        if root.is_dir() {
            log::info!("Removing {}", root.display());
            std::fs::remove_dir_all(root)?;
            removed.push(root.clone());
        }
    }

    let binary = layout.binary_path();
    if binary.is_file() {
        log::info!("Removing {}", binary.display());
        std::fs::remove_file(&binary)?;
        removed.push(binary);
    }
    Ok(removed)
}

fn removable_root(root: &Path, layout: &BuildLayout, project_dir: &Path) -> bool {
    let root = canonical(root);
    !canonical(project_dir).starts_with(&root) && !canonical(&layout.source_root).starts_with(&root)
}

/// Resolves a path on disk, falling back to the path itself when it does not exist.
fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
