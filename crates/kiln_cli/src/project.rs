//! Project root resolution and configuration loading shared by commands.

use std::path::{Path, PathBuf};

use kiln_config::{load_config, load_config_from_str, ProjectConfig, CONFIG_FILE};

use crate::GlobalArgs;

/// Executable name used when the project directory has no usable name.
const FALLBACK_NAME: &str = "a.out";

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `kiln.toml`,
/// falling back to the current directory itself. The result is always
/// absolute: the toolchain runs inside it and receives paths rooted at it.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let Some(ref config_path) = global.config else {
        return Ok(find_project_root(&cwd).unwrap_or(cwd));
    };

    let p = PathBuf::from(config_path);
    let dir = if p.is_file() {
        p.parent().map(Path::to_path_buf).unwrap_or_default()
    } else if p.is_dir() {
        p
    } else {
        return Err(format!("config path {} does not exist", p.display()).into());
    };
    if dir.as_os_str().is_empty() {
        Ok(cwd)
    } else {
        Ok(cwd.join(dir))
    }
}

/// Loads the project configuration for `project_dir`.
///
/// An explicit `--config` file is read as-is, whatever its name. Otherwise
/// `<project_dir>/kiln.toml` is used when present; without one, every
/// setting is defaulted and the executable is named after the directory.
pub fn load_project(
    project_dir: &Path,
    global: &GlobalArgs,
) -> Result<ProjectConfig, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = Path::new(config_path);
        if p.is_file() {
            let content = std::fs::read_to_string(p)?;
            return Ok(load_config_from_str(&content)?);
        }
    }
    if project_dir.join(CONFIG_FILE).is_file() {
        return Ok(load_config(project_dir)?);
    }
    log::debug!(
        "no {CONFIG_FILE} in {}, using defaults",
        project_dir.display()
    );
    Ok(ProjectConfig::named(&default_name(project_dir)))
}

/// Names the executable after the project directory.
fn default_name(project_dir: &Path) -> String {
    project_dir
        .canonicalize()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}
