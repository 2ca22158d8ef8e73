//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::resolve::rooted;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name looked up in the project directory.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Loads and validates `kiln.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let path = project_dir.join(CONFIG_FILE);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a `kiln.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks required fields and rejects layouts that would make artifacts collide.
pub fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.toolchain.compiler.is_empty() {
        return Err(ConfigError::MissingField("toolchain.compiler".to_string()));
    }

    let layout = &config.layout;
    if layout.source_extensions.is_empty() {
        return Err(ConfigError::MissingField(
            "layout.source_extensions".to_string(),
        ));
    }
    if let Some(ext) = layout
        .source_extensions
        .iter()
        .find(|e| e.is_empty() || e.starts_with('.'))
    {
        return Err(ConfigError::ValidationError(format!(
            "source extension '{ext}' must be non-empty and written without a leading dot"
        )));
    }
    for (field, suffix) in [
        ("layout.object_suffix", &layout.object_suffix),
        ("layout.manifest_suffix", &layout.manifest_suffix),
    ] {
        if suffix.is_empty() || suffix.starts_with('.') {
            return Err(ConfigError::ValidationError(format!(
                "{field} must be non-empty and written without a leading dot"
            )));
        }
    }
    if rooted(Path::new(""), &layout.object_dir) == rooted(Path::new(""), &layout.manifest_dir)
        && layout.object_suffix == layout.manifest_suffix
    {
        return Err(ConfigError::ValidationError(
            "objects and manifests would share paths; change object_dir, manifest_dir or a suffix"
                .to_string(),
        ));
    }
    Ok(())
}
