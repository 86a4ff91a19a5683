//! Cover view flag injection into the engine integration plugin

use std::path::Path;

use super::plugins::engine_plugin_entry;
use super::prepend_to_file;
use crate::error::Result;

/// Global the engine plugin reads to decide whether to draw its own cover view
pub const COVERVIEW_PROPERTY: &str = "GameGlobal.pluginEnv.coverviewCustomized";

pub fn coverview_line(flag: bool) -> String {
    format!("{} = {};", COVERVIEW_PROPERTY, flag)
}

/// Prepend the flag assignment to the engine plugin's entry script. Returns
/// false when the plugin is not installed.
pub fn inject_coverview(root: &Path, flag: bool) -> Result<bool> {
    let entry = engine_plugin_entry(root);
    if !entry.is_file() {
        tracing::info!("{} does not exist, skipping", entry.display());
        return Ok(false);
    }

    prepend_to_file(&entry, &coverview_line(flag))?;
    tracing::info!("Prepended coverviewCustomized = {} to {}", flag, entry.display());
    Ok(true)
}
