//! Source transpilation

use std::path::Path;

use crate::error::Result;
use crate::tools::Transpiler;

/// Directory the transpiler leaves behind once it has run over a tree
pub const TRANSPILE_MARKER: &str = "@babel";

/// Run the transpiler over the project tree unless it already has. Returns
/// whether the transpiler was invoked.
pub fn transpile(root: &Path, transpiler: &dyn Transpiler) -> Result<bool> {
    if root.join(TRANSPILE_MARKER).exists() {
        tracing::info!("Found {} in {}, skipping transpilation", TRANSPILE_MARKER, root.display());
        return Ok(false);
    }

    tracing::info!("Running transpiler over {}", root.display());
    transpiler.transpile(root)?;
    tracing::info!("Transpilation completed");
    Ok(true)
}
