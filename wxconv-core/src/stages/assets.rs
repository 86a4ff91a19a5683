//! Copy the exported project into the output tree

use std::fs;
use std::path::Path;

use super::{copy_file, copy_tree};
use crate::error::{ConvertError, Result};
use crate::prompt::Confirm;

/// Editor metadata and backups that never belong in the package
pub fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || name == "__pycache__" || name.ends_with(".meta") || name.ends_with(".bak")
}

/// Copy `source` to `target`, skipping excluded entries while walking.
///
/// An existing `target` is removed only after the operator confirms.
pub fn copy_assets(source: &Path, target: &Path, confirm: &mut dyn Confirm) -> Result<()> {
    if target.exists() {
        tracing::info!("Found existing directory: {}", target.display());
        let question = format!("Target directory {} exists. Overwrite?", target.display());
        if !confirm.confirm(&question) {
            return Err(ConvertError::Cancelled);
        }
        tracing::info!("Removing existing directory {}", target.display());
        fs::remove_dir_all(target).map_err(|e| ConvertError::io(target, e))?;
    }

    tracing::info!("Copying files from {} to {}", source.display(), target.display());
    copy_tree(source, target, &is_excluded, &mut copy_file)
}
