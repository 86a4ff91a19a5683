//! wxconv Core Library
//!
//! This crate converts an exported engine build into a mini-game package:
//! - Source/target path validation and project copying
//! - `game.json` rewriting
//! - Plugin resolution against a local bundle cache
//! - Transpilation and runtime patching of the project scripts
//! - Main and subpackage archive creation

pub mod context;
pub mod error;
pub mod path_utils;
pub mod pipeline;
pub mod prompt;
pub mod settings;
pub mod stages;
pub mod tools;
pub mod types;

// Re-export commonly used types
pub use context::ConversionContext;
pub use error::{ConvertError, Result};
pub use pipeline::{ConversionReport, Pipeline, PipelineOptions, PipelineOutcome, STAGE_COUNT};
pub use prompt::{is_affirmative, AssumeYes, Confirm};
pub use settings::{Resources, Settings, ToolCommand};
pub use stages::package::{ArchiveInfo, PackReport};
pub use stages::plugins::PluginOutcome;
pub use stages::wasm::PatchReport;
pub use tools::{CommandTool, ScriptMinifier, Transpiler};
pub use types::{GameConfig, PluginDescriptor, SubpackageDescriptor, CONVERTER_VERSION};
pub use path_utils::{normalize_path, path_to_string};
