//! Converter settings
//!
//! Optional `wxconv.toml` describing where the bundled resources live and how
//! the external minifier and transpiler are invoked. Every key has a default,
//! so running without a settings file is the normal case.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConvertError, Result};

/// File name looked up next to the executable
pub const SETTINGS_FILE_NAME: &str = "wxconv.toml";

/// Directory holding plugin bundles and the injected scripts
pub const CACHE_DIR_NAME: &str = "wx_unity_converter";

/// Settings loaded from `wxconv.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root of the bundled resources (default: the executable's directory)
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,

    /// Babel config passed to the transpiler (default: `<resources>/.babelrc`)
    #[serde(default)]
    pub babel_config: Option<PathBuf>,

    /// Script minifier invocation
    #[serde(default = "default_minifier")]
    pub minifier: ToolCommand,

    /// Source transpiler invocation
    #[serde(default = "default_transpiler")]
    pub transpiler: ToolCommand,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resources_dir: None,
            babel_config: None,
            minifier: default_minifier(),
            transpiler: default_transpiler(),
        }
    }
}

/// A command line template. `args` may contain the placeholders `{input}`,
/// `{output}` and `{babel_config}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn npx() -> String {
    let program = if cfg!(windows) { "npx.cmd" } else { "npx" };
    program.to_string()
}

fn default_minifier() -> ToolCommand {
    ToolCommand {
        program: npx(),
        args: ["terser", "{input}", "-o", "{output}", "--compress", "--mangle"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

fn default_transpiler() -> ToolCommand {
    ToolCommand {
        program: npx(),
        args: [
            "babel",
            "--config-file",
            "{babel_config}",
            "{input}",
            "-d",
            "{output}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    }
}

impl Settings {
    /// Parse settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConvertError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConvertError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load settings from the first location that exists: `explicit`, then
    /// `wxconv.toml` beside the executable, then the user config directory.
    /// An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let candidates = [
            install_dir().map(|dir| dir.join(SETTINGS_FILE_NAME)),
            user_settings_path(),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Ok((Self::from_file(&path)?, Some(path)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Resolve the resource layout. `override_dir` wins over the settings file.
    pub fn resources(&self, override_dir: Option<&Path>) -> Resources {
        let root = override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.resources_dir.clone())
            .or_else(install_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let babel_config = self
            .babel_config
            .clone()
            .unwrap_or_else(|| root.join(".babelrc"));
        Resources { root, babel_config }
    }
}

/// Directory containing the running executable
pub fn install_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Per-user settings file, e.g. `~/.config/wxconv/config.toml` on Linux
pub fn user_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wxconv").join("config.toml"))
}

/// Files the converter ships alongside its executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    pub root: PathBuf,
    pub babel_config: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let babel_config = root.join(".babelrc");
        Self { root, babel_config }
    }

    /// Local cache of known plugin bundles
    pub fn plugin_cache(&self) -> PathBuf {
        self.root.join(CACHE_DIR_NAME)
    }

    /// Runtime support script prepended to `game.js`
    pub fn injection_script(&self) -> PathBuf {
        self.plugin_cache().join("wx_unity.js")
    }

    /// Version check script copied into the converted project
    pub fn version_script(&self) -> PathBuf {
        self.plugin_cache().join("check-version.js")
    }

    /// Prebuilt engine integration plugin
    pub fn engine_plugin_artifact(&self) -> PathBuf {
        self.root
            .join("libs")
            .join("UnityPlugin")
            .join("dist")
            .join("index.js")
    }
}
