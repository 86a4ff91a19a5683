//! Version check script

use std::path::{Path, PathBuf};

use super::copy_file;
use crate::error::{ConvertError, Result};
use crate::settings::Resources;

pub const VERSION_SCRIPT: &str = "check-version.js";

/// Copy the version check script into the project root
pub fn stamp_version(root: &Path, resources: &Resources) -> Result<PathBuf> {
    let script = resources.version_script();
    if !script.is_file() {
        return Err(ConvertError::MissingBuildArtifact {
            path: script,
            hint: "the converter installation is incomplete".to_string(),
        });
    }

    let destination = root.join(VERSION_SCRIPT);
    copy_file(&script, &destination)?;
    tracing::info!("Injected version checker {}", destination.display());
    Ok(destination)
}
