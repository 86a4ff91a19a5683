//! Project configuration types
//!
//! Models the mini-game `game.json` manifest and the plugin and subpackage
//! declarations it carries.

mod game_config;

pub use game_config::*;
