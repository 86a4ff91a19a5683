//! Runtime support injection into the entry script

use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// Entry script of a mini-game project
pub const ENTRY_SCRIPT: &str = "game.js";

/// First line of the injected block
pub const INJECTION_MARKER: &str = "/* Unity Converter Injection */";

/// Prepend the runtime support script to `entry_script`.
///
/// A missing injection file only produces a warning. Returns whether the
/// entry script was rewritten.
pub fn inject_runtime(entry_script: &Path, injection_file: &Path) -> Result<bool> {
    let injection = match fs::read_to_string(injection_file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Missing injection file {}", injection_file.display());
            return Ok(false);
        }
        Err(e) => return Err(ConvertError::io(injection_file, e)),
    };

    let original = fs::read_to_string(entry_script).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConvertError::MissingEntryScript(entry_script.to_path_buf()),
        _ => ConvertError::io(entry_script, e),
    })?;

    fs::write(
        entry_script,
        format!("{}\n{}\n{}", INJECTION_MARKER, injection, original),
    )
    .map_err(|e| ConvertError::io(entry_script, e))?;

    tracing::info!("Injected runtime support into {}", entry_script.display());
    Ok(true)
}
