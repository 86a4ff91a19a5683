//! WASM loader patching
//!
//! `wasm-split.js` probes host globals the mini-game runtime does not provide.
//! Each probe is redirected to a local variable declared `false` at the top of
//! the file.

use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// Optional WASM loader script, relative to the project root
pub const WASM_LOADER: &str = "wasm-split.js";

/// Replace `pattern` with `replacement` and declare `replacement` as `false`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchRule {
    pub pattern: &'static str,
    pub replacement: &'static str,
}

impl PatchRule {
    fn declaration(&self) -> String {
        format!("var {} = false;", self.replacement)
    }
}

pub const WASM_RULES: &[PatchRule] = &[
    PatchRule {
        pattern: "GameGlobal.isIOSHighPerformanceMode",
        replacement: "__rep_isIOSHighPerformanceMode",
    },
    PatchRule {
        pattern: "GameGlobal.canUseH5Renderer",
        replacement: "__rep_canUseH5Renderer",
    },
];

/// Summary of a patch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    /// Rules that matched at least once
    pub modified: usize,
    /// Rules tried
    pub total: usize,
    /// Occurrences replaced across all rules
    pub replacements: usize,
}

/// Apply `rules` to `source` in order.
///
/// A rule with no occurrences is skipped. Every rule that matches adds its
/// declaration on top of whatever was already prepended, so the last matching
/// rule's declaration ends up on the first line.
pub fn apply_rules(source: &str, rules: &[PatchRule]) -> (String, PatchReport) {
    let mut body = source.to_string();
    let mut prefix = String::new();
    let mut report = PatchReport {
        modified: 0,
        total: rules.len(),
        replacements: 0,
    };

    for rule in rules {
        let count = body.matches(rule.pattern).count();
        if count == 0 {
            tracing::debug!("No occurrences of '{}' found", rule.pattern);
            continue;
        }

        body = body.replace(rule.pattern, rule.replacement);
        tracing::info!(
            "Replaced {} occurrence(s) of '{}' with '{}'",
            count,
            rule.pattern,
            rule.replacement
        );
        prefix = format!("{}\n{}", rule.declaration(), prefix);
        report.modified += 1;
        report.replacements += count;
    }

    (format!("{}{}", prefix, body), report)
}

/// Patch `wasm-split.js` if the project has one
pub fn patch_wasm_split(root: &Path) -> Result<Option<PatchReport>> {
    let path = root.join(WASM_LOADER);
    if !path.is_file() {
        tracing::info!("{} not found, skipping", WASM_LOADER);
        return Ok(None);
    }

    let source = fs::read_to_string(&path).map_err(|e| ConvertError::io(&path, e))?;
    let (patched, report) = apply_rules(&source, WASM_RULES);
    if report.modified > 0 {
        fs::write(&path, patched).map_err(|e| ConvertError::io(&path, e))?;
    }

    tracing::info!(
        "Completed WASM processing: {} of {} patterns modified",
        report.modified,
        report.total
    );
    Ok(Some(report))
}
