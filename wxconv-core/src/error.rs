//! Conversion errors
//!
//! Every fatal condition a stage can hit maps to one variant. Degraded but
//! continuable conditions are logged as warnings instead and never show up here.

use std::path::PathBuf;

/// Errors that abort a conversion run
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Source path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid target path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Failed to copy {from} to {to}: {source}")]
    CopyError {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing game configuration file (looked for game.json and manifest.json in {0})")]
    MissingConfig(PathBuf),

    #[error("Failed to parse game configuration {path}: {source}")]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing entry script: {0}")]
    MissingEntryScript(PathBuf),

    #[error("Missing build artifact {path}: {hint}")]
    MissingBuildArtifact { path: PathBuf, hint: String },

    #[error("{tool} failed: {detail}")]
    ExternalToolFailure { tool: String, detail: String },

    #[error("Failed to write archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to load settings from {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operator declined a confirmation prompt. Not a failure.
    #[error("Operation cancelled by user")]
    Cancelled,
}

impl ConvertError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
