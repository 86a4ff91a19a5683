//! Source and target path resolution

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::path_utils::{find_reserved_segment, is_case_insensitive_fs};
use crate::prompt::Confirm;

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| ConvertError::InvalidPath {
        path: path.to_path_buf(),
        reason: format!("cannot resolve to an absolute path ({})", e),
    })
}

/// Resolve the exported project directory; it must exist
pub fn resolve_source(path: &Path) -> Result<PathBuf> {
    let resolved = absolute(path)?;
    if !resolved.exists() {
        return Err(ConvertError::PathNotFound(resolved));
    }
    Ok(resolved)
}

/// Reject paths containing a reserved device name segment
pub fn check_reserved_names(path: &Path) -> Result<()> {
    match find_reserved_segment(path) {
        Some(segment) => Err(ConvertError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("contains reserved name '{}'", segment),
        }),
        None => Ok(()),
    }
}

/// Prepare the output directory.
///
/// A non-empty existing directory is deleted after the operator confirms; a
/// refusal yields [`ConvertError::Cancelled`]. The directory and any missing
/// ancestors are then created.
pub fn resolve_target(path: &Path, confirm: &mut dyn Confirm) -> Result<PathBuf> {
    if is_case_insensitive_fs() {
        check_reserved_names(path)?;
    }
    let resolved = absolute(path)?;

    if resolved.exists() && !is_empty_dir(&resolved)? {
        let question = format!("Target directory {} is not empty. Continue?", resolved.display());
        if !confirm.confirm(&question) {
            return Err(ConvertError::Cancelled);
        }
        tracing::info!("Removing existing directory {}", resolved.display());
        fs::remove_dir_all(&resolved).map_err(|e| ConvertError::io(&resolved, e))?;
    }

    fs::create_dir_all(&resolved).map_err(|e| ConvertError::io(&resolved, e))?;
    Ok(resolved)
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(entries.next().is_none())
}
