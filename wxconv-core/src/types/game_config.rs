//! Mini-game project configuration
//!
//! Defines the `game.json` / `manifest.json` document format. The document is
//! held as one ordered JSON object so every key keeps its value, type and
//! position across a rewrite. The accessors below read the keys the converter
//! cares about on demand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COMPANY: &str = "DefaultCompany";
pub const DEFAULT_PRODUCT: &str = "My Project";
pub const DEFAULT_VERSION: &str = "0.1";
pub const CONVERTER_VERSION: &str = "2.0.1";

const ORIENTATION: &str = "orientation";
const DEVICE_ORIENTATION: &str = "deviceOrientation";
const COVERVIEW_CUSTOMIZED: &str = "coverviewCustomized";
const PLUGINS: &str = "plugins";
const SUB_PACKAGES: &str = "subPackages";
const SUBPACKAGES_LOWER: &str = "subpackages";

/// The project configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameConfig(Map<String, Value>);

impl GameConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Overwrite the product metadata with the converter's fixed values.
    /// Existing keys keep their position; missing ones are appended.
    pub fn apply_defaults(&mut self) {
        for (key, value) in [
            ("companyName", DEFAULT_COMPANY),
            ("productName", DEFAULT_PRODUCT),
            ("productVersion", DEFAULT_VERSION),
            ("convertScriptVersion", CONVERTER_VERSION),
        ] {
            self.0.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    /// Move `orientation` to `deviceOrientation`. Returns true if a rename happened.
    pub fn rename_orientation(&mut self) -> bool {
        let Some(value) = self.0.get(ORIENTATION).cloned() else {
            return false;
        };
        self.0.insert(DEVICE_ORIENTATION.to_string(), value);
        self.0.retain(|key, _| key != ORIENTATION);
        true
    }

    /// Whether the project ships its own cover view, `false` when unset
    pub fn coverview_customized(&self) -> bool {
        self.0.get(COVERVIEW_CUSTOMIZED).is_some_and(is_truthy)
    }

    /// Flatten the plugin manifest into descriptors, preserving document order.
    /// A non-object manifest declares no plugins.
    pub fn plugin_descriptors(&self) -> Vec<PluginDescriptor> {
        let Some(plugins) = self.0.get(PLUGINS).and_then(Value::as_object) else {
            return Vec::new();
        };
        plugins
            .iter()
            .map(|(name, entry)| PluginDescriptor {
                name: name.clone(),
                version: entry.get("version").and_then(value_to_string),
                provider: entry.get("provider").and_then(value_to_string),
            })
            .collect()
    }

    /// Declared subpackages. `subPackages` wins over `subpackages` whenever the
    /// key is present. Entries without a usable `name` and `root` are skipped
    /// with a warning.
    pub fn subpackages(&self) -> Vec<SubpackageDescriptor> {
        let declared = self
            .0
            .get(SUB_PACKAGES)
            .or_else(|| self.0.get(SUBPACKAGES_LOWER));
        let Some(entries) = declared.and_then(Value::as_array) else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                match SubpackageDescriptor::deserialize(entry) {
                    Ok(descriptor) => Some(descriptor),
                    Err(e) => {
                        tracing::warn!("Ignoring invalid subpackage entry {}: {}", entry, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Top-level key/value pairs as they will be written
    pub fn entries(&self) -> &Map<String, Value> {
        &self.0
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// JSON truthiness: null, false, 0, "" and empty containers are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A plugin declared by the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: Option<String>,
    pub provider: Option<String>,
}

/// Engine integration plugin, installed from a prebuilt artifact
pub const ENGINE_PLUGIN: &str = "UnityPlugin";

/// Plugins replaced by local mock implementations
pub const MOCK_PLUGINS: &[&str] = &["MinigameLoading", "MiniGameCommon", "MiniGameCenter"];

/// The only plugin that may be resolved by provider when the version is missing
pub const PROVIDER_FALLBACK_PLUGIN: &str = "layaPlugin";

/// How a plugin is looked up in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    EngineIntegration,
    MockReplacement,
    Versioned,
}

impl PluginDescriptor {
    pub fn new(name: &str, version: Option<&str>, provider: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            version: version.map(str::to_string),
            provider: provider.map(str::to_string),
        }
    }

    pub fn kind(&self) -> PluginKind {
        if self.name == ENGINE_PLUGIN {
            PluginKind::EngineIntegration
        } else if MOCK_PLUGINS.contains(&self.name.as_str()) {
            PluginKind::MockReplacement
        } else {
            PluginKind::Versioned
        }
    }

    /// Cache directory name for this plugin, if one can be derived
    pub fn cache_key(&self) -> Option<String> {
        match self.kind() {
            PluginKind::EngineIntegration => None,
            PluginKind::MockReplacement => Some(self.name.clone()),
            PluginKind::Versioned => self
                .version
                .as_ref()
                .map(|version| format!("{}-{}", self.name, version)),
        }
    }

    /// Provider-keyed cache directory name, only for the fallback-eligible plugin
    pub fn provider_cache_key(&self) -> Option<String> {
        if self.name != PROVIDER_FALLBACK_PLUGIN {
            return None;
        }
        self.provider
            .as_ref()
            .map(|provider| format!("{}-{}", self.name, provider))
    }
}

impl std::fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (version: {}, provider: {})",
            self.name,
            self.version.as_deref().unwrap_or("none"),
            self.provider.as_deref().unwrap_or("none")
        )
    }
}

/// A subpackage declared by the project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubpackageDescriptor {
    pub name: String,

    /// Project-relative directory, may carry leading/trailing slashes
    pub root: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubpackageDescriptor {
    pub fn new(name: &str, root: &str) -> Self {
        Self {
            name: name.to_string(),
            root: root.to_string(),
            extra: Map::new(),
        }
    }

    /// `root` without leading/trailing slashes
    pub fn trimmed_root(&self) -> &str {
        crate::path_utils::trim_root(&self.root)
    }
}
