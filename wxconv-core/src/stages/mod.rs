//! Conversion stages
//!
//! One module per pipeline step, in the order [`crate::Pipeline`] runs them.
//! Shared filesystem helpers live here.

pub mod paths;
pub mod assets;
pub mod config;
pub mod plugins;
pub mod transpile;
pub mod runtime;
pub mod wasm;
pub mod coverview;
pub mod version;
pub mod package;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// Recursively copy `source` into `target`.
///
/// Entries for which `skip` returns true are never visited, so excluded
/// directories are not descended into. Every file goes through `copy_file`;
/// directory creation and traversal failures are reported as `CopyError`.
pub(crate) fn copy_tree<S, F>(source: &Path, target: &Path, skip: &S, copy_file: &mut F) -> Result<()>
where
    S: Fn(&str) -> bool,
    F: FnMut(&Path, &Path) -> Result<()>,
{
    fs::create_dir_all(target).map_err(|e| copy_error(source, target, e))?;

    let entries = fs::read_dir(source).map_err(|e| copy_error(source, target, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| copy_error(source, target, e))?;
        let name = entry.file_name();
        if skip(&name.to_string_lossy()) {
            continue;
        }

        let from = entry.path();
        let to = target.join(&name);
        if from.is_dir() {
            copy_tree(&from, &to, skip, copy_file)?;
        } else {
            copy_file(&from, &to)?;
        }
    }

    Ok(())
}

/// Plain file copy, mapped to `CopyError`
pub(crate) fn copy_file(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| copy_error(from, to, e))
}

pub(crate) fn copy_error(from: &Path, to: &Path, source: std::io::Error) -> ConvertError {
    ConvertError::CopyError {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

/// All regular files under `root`, sorted, as absolute paths
pub(crate) fn list_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))? {
        let path = entry.map_err(|e| ConvertError::io(dir, e))?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Put `prefix` on its own line(s) in front of the file's content, in one write
pub(crate) fn prepend_to_file(path: &Path, prefix: &str) -> Result<()> {
    let original = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
    fs::write(path, format!("{}\n{}", prefix, original)).map_err(|e| ConvertError::io(path, e))
}

/// Remove a directory tree if it exists
pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| ConvertError::io(path, e))?;
    }
    Ok(())
}
