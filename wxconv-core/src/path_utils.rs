//! Cross-platform path utilities
//!
//! Windows paths use backslashes (`\`) while archive member names and
//! subpackage roots always use forward slashes (`/`).

use std::path::{Component, Path};

/// Device names Windows refuses as a path segment, regardless of case
pub const RESERVED_NAMES: &[&str] = &[
    "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8",
    "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Normalize path to forward slashes
#[inline]
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert a path to a normalized string
#[inline]
pub fn path_to_string(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Strip leading and trailing slashes from a project-relative root
pub fn trim_root(root: &str) -> &str {
    root.trim_matches('/')
}

/// Find the first segment of `path` that is a reserved device name
pub fn find_reserved_segment(path: &Path) -> Option<String> {
    path.components().find_map(|component| match component {
        Component::Normal(segment) => {
            let segment = segment.to_string_lossy();
            RESERVED_NAMES
                .contains(&segment.to_lowercase().as_str())
                .then(|| segment.into_owned())
        }
        _ => None,
    })
}

/// Whether the host filesystem treats names case-insensitively
#[inline]
pub fn is_case_insensitive_fs() -> bool {
    cfg!(windows)
}
