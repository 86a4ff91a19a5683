//! Rewrite the project configuration file

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::GameConfig;

/// Configuration file names, in lookup order
pub const CONFIG_FILE_NAMES: &[&str] = &["game.json", "manifest.json"];

/// Locate the configuration file inside the project tree
pub fn find_config_file(root: &Path) -> Result<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| ConvertError::MissingConfig(root.to_path_buf()))
}

/// Result of the config stage
#[derive(Debug, Clone)]
pub struct ConfigOutcome {
    pub path: PathBuf,
    pub config: GameConfig,
    /// `coverviewCustomized` as read before any rewrite
    pub coverview_customized: bool,
}

/// Load, rewrite and persist the project configuration.
///
/// The fixed product metadata is overwritten, `orientation` moves to
/// `deviceOrientation`, and the whole document replaces the file's content.
pub fn transform_config(root: &Path) -> Result<ConfigOutcome> {
    let path = find_config_file(root)?;
    let content = fs::read_to_string(&path).map_err(|e| ConvertError::io(&path, e))?;
    let mut config: GameConfig =
        serde_json::from_str(&content).map_err(|source| ConvertError::MalformedConfig {
            path: path.clone(),
            source,
        })?;

    let coverview_customized = config.coverview_customized();

    config.apply_defaults();
    if config.rename_orientation() {
        tracing::debug!("Renamed orientation to deviceOrientation");
    }

    let serialized = serde_json::to_string_pretty(&config).map_err(|source| {
        ConvertError::MalformedConfig {
            path: path.clone(),
            source,
        }
    })?;
    fs::write(&path, serialized).map_err(|e| ConvertError::io(&path, e))?;

    tracing::info!("Game configuration ({}):", path.display());
    for (key, value) in config.entries() {
        tracing::info!("  {}: {}", key, value);
    }

    Ok(ConfigOutcome {
        path,
        config,
        coverview_customized,
    })
}
