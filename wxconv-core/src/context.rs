//! Per-run conversion state

use std::path::PathBuf;

use crate::types::GameConfig;

/// Name of the converted project directory inside the target
pub const GAME_DIR_NAME: &str = "game";

/// State shared by the stages of a single conversion run.
///
/// Created by [`crate::Pipeline::run`] and dropped when the run ends; stages
/// only borrow it for the duration of their own call.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    /// Resolved source project
    pub source: PathBuf,
    /// Resolved output directory (holds `game/`, `game.zip`, `subpkg/`)
    pub target: PathBuf,
    /// Parsed project configuration, set by the config stage
    pub config: Option<GameConfig>,
    /// Captured from `coverviewCustomized` before the config is rewritten
    pub coverview_customized: bool,
    /// Pack subpackages into their own archives
    pub split_subpackages: bool,
}

impl ConversionContext {
    pub fn new(source: PathBuf, target: PathBuf, split_subpackages: bool) -> Self {
        Self {
            source,
            target,
            config: None,
            coverview_customized: false,
            split_subpackages,
        }
    }

    /// The converted project tree, `<target>/game`
    pub fn game_dir(&self) -> PathBuf {
        self.target.join(GAME_DIR_NAME)
    }
}
