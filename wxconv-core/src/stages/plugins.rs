//! Plugin resolution
//!
//! Matches the plugins declared in the project configuration against the local
//! cache of known bundles and installs the matches under `cachedPlugin/`.

use std::fs;
use std::path::{Path, PathBuf};

use super::{copy_file, copy_tree, remove_dir_if_exists};
use crate::error::{ConvertError, Result};
use crate::settings::Resources;
use crate::tools::ScriptMinifier;
use crate::types::{PluginDescriptor, PluginKind, ENGINE_PLUGIN};

/// Directory inside the project tree where plugins are installed
pub const PLUGIN_DIR_NAME: &str = "cachedPlugin";

/// Entry script of the engine integration plugin, relative to the project root
pub fn engine_plugin_entry(root: &Path) -> PathBuf {
    root.join(PLUGIN_DIR_NAME).join(ENGINE_PLUGIN).join("index.js")
}

/// What happened to one declared plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOutcome {
    /// Engine integration plugin installed from the prebuilt artifact
    EngineInstalled { name: String },
    /// Bundle copied from `<name>-<version>`
    Copied { name: String, bundle: PathBuf },
    /// Declared plugin replaced by the local mock
    MockSubstituted { name: String, bundle: PathBuf },
    /// Version missing, bundle found by provider instead
    ProviderFallback { name: String, bundle: PathBuf },
    /// No usable bundle; the plugin is left out
    Unsupported { name: String },
}

impl PluginOutcome {
    pub fn is_installed(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

/// Resolve and install every declared plugin, in order.
///
/// Unmatched plugins are reported and skipped. A minifier failure aborts the
/// whole run.
pub fn resolve_plugins(
    root: &Path,
    plugins: &[PluginDescriptor],
    resources: &Resources,
    minifier: &dyn ScriptMinifier,
) -> Result<Vec<PluginOutcome>> {
    let cache = resources.plugin_cache();
    let mut outcomes = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        let outcome = resolve_plugin(root, plugin, &cache, resources, minifier)?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn resolve_plugin(
    root: &Path,
    plugin: &PluginDescriptor,
    cache: &Path,
    resources: &Resources,
    minifier: &dyn ScriptMinifier,
) -> Result<PluginOutcome> {
    let name = plugin.name.clone();

    if plugin.kind() == PluginKind::EngineIntegration {
        install_engine_plugin(root, resources)?;
        return Ok(PluginOutcome::EngineInstalled { name });
    }

    let destination = root.join(PLUGIN_DIR_NAME).join(&plugin.name);

    if let Some(bundle) = plugin.cache_key().map(|key| cache.join(key)).filter(|p| p.is_dir()) {
        let mock = plugin.kind() == PluginKind::MockReplacement;
        if mock {
            tracing::warn!(
                "Using the bundled mock of {} instead of the original plugin so the game can run",
                plugin.name
            );
        }
        tracing::info!("Copied plugin {}", plugin);
        copy_plugin_bundle(&bundle, &destination, minifier)?;
        return Ok(if mock {
            PluginOutcome::MockSubstituted { name, bundle }
        } else {
            PluginOutcome::Copied { name, bundle }
        });
    }

    if let Some(key) = plugin.provider_cache_key() {
        let bundle = cache.join(key);
        if bundle.is_dir() {
            tracing::warn!(
                "The game is using {}: version is missing but its provider was found. \
                 The converted game may not function properly.",
                plugin
            );
            tracing::info!("Copied plugin {}", plugin);
            copy_plugin_bundle(&bundle, &destination, minifier)?;
            return Ok(PluginOutcome::ProviderFallback { name, bundle });
        }
        tracing::warn!("Missing both version and provider bundle for {}", plugin);
    }

    tracing::warn!("Unsupported plugin, ignoring {}", plugin);
    Ok(PluginOutcome::Unsupported { name })
}

/// Copy the prebuilt engine integration script into the project
pub fn install_engine_plugin(root: &Path, resources: &Resources) -> Result<PathBuf> {
    let artifact = resources.engine_plugin_artifact();
    if !artifact.is_file() {
        return Err(ConvertError::MissingBuildArtifact {
            path: artifact,
            hint: format!("{} not found. Run 'npm run build' in libs/{}", ENGINE_PLUGIN, ENGINE_PLUGIN),
        });
    }

    let entry = engine_plugin_entry(root);
    if let Some(parent) = entry.parent() {
        fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
    }
    copy_file(&artifact, &entry)?;
    tracing::info!("Copied plugin {}", entry.display());
    Ok(entry)
}

/// Copy a plugin bundle, minifying scripts and copying everything else
/// verbatim. The destination is cleared first. Returns the number of scripts
/// minified.
pub fn copy_plugin_bundle(
    bundle: &Path,
    destination: &Path,
    minifier: &dyn ScriptMinifier,
) -> Result<usize> {
    remove_dir_if_exists(destination)?;

    let mut minified = 0;
    copy_tree(bundle, destination, &|_: &str| false, &mut |from: &Path, to: &Path| {
        if from.extension().is_some_and(|ext| ext == "js") {
            minified += 1;
            minifier.minify(from, to)
        } else {
            copy_file(from, to)
        }
    })?;

    tracing::debug!("Minified {} script(s) from {}", minified, bundle.display());
    Ok(minified)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Copies scripts with a marker line instead of running a real minifier
    #[derive(Default)]
    pub(crate) struct FakeMinifier {
        pub fail: bool,
        pub calls: RefCell<Vec<PathBuf>>,
    }

    impl ScriptMinifier for FakeMinifier {
        fn minify(&self, input: &Path, output: &Path) -> Result<()> {
            self.calls.borrow_mut().push(input.to_path_buf());
            if self.fail {
                return Err(ConvertError::ExternalToolFailure {
                    tool: "minifier".to_string(),
                    detail: "exit status: 1".to_string(),
                });
            }
            let source = fs::read_to_string(input).unwrap();
            fs::write(output, format!("/*min*/{}", source)).unwrap();
            Ok(())
        }
    }

    fn setup() -> (TempDir, PathBuf, Resources) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("game");
        fs::create_dir_all(&root).unwrap();
        let resources = Resources::new(temp_dir.path().join("tool"));
        fs::create_dir_all(resources.plugin_cache()).unwrap();
        (temp_dir, root, resources)
    }

    fn add_bundle(resources: &Resources, dir: &str) {
        let bundle = resources.plugin_cache().join(dir);
        fs::create_dir_all(bundle.join("lib")).unwrap();
        fs::write(bundle.join("index.js"), "module.exports = {};").unwrap();
        fs::write(bundle.join("lib/util.js"), "exports.a = 1;").unwrap();
        fs::write(bundle.join("plugin.json"), r#"{"main":"index.js"}"#).unwrap();
    }

    #[test]
    fn test_versioned_plugin_copied_and_minified() {
        let (_temp, root, resources) = setup();
        add_bundle(&resources, "cocosPlugin-1.0.4");
        let minifier = FakeMinifier::default();

        let outcomes = resolve_plugins(
            &root,
            &[PluginDescriptor::new("cocosPlugin", Some("1.0.4"), None)],
            &resources,
            &minifier,
        )
        .unwrap();

        assert!(matches!(outcomes[0], PluginOutcome::Copied { .. }));
        let dest = root.join("cachedPlugin/cocosPlugin");
        assert_eq!(
            fs::read_to_string(dest.join("index.js")).unwrap(),
            "/*min*/module.exports = {};"
        );
        assert_eq!(
            fs::read_to_string(dest.join("lib/util.js")).unwrap(),
            "/*min*/exports.a = 1;"
        );
        assert_eq!(
            fs::read_to_string(dest.join("plugin.json")).unwrap(),
            r#"{"main":"index.js"}"#
        );
        assert_eq!(minifier.calls.borrow().len(), 2);
    }

    #[test]
    fn test_mock_plugin_ignores_version() {
        let (_temp, root, resources) = setup();
        add_bundle(&resources, "MiniGameCenter");
        let minifier = FakeMinifier::default();

        let outcomes = resolve_plugins(
            &root,
            &[PluginDescriptor::new("MiniGameCenter", Some("9.9.9"), None)],
            &resources,
            &minifier,
        )
        .unwrap();

        assert!(matches!(outcomes[0], PluginOutcome::MockSubstituted { .. }));
        assert!(root.join("cachedPlugin/MiniGameCenter/index.js").exists());
    }

    #[test]
    fn test_provider_fallback() {
        let (_temp, root, resources) = setup();
        add_bundle(&resources, "layaPlugin-wx70d8aa25ec591f7a");
        let minifier = FakeMinifier::default();

        let outcomes = resolve_plugins(
            &root,
            &[PluginDescriptor::new("layaPlugin", None, Some("wx70d8aa25ec591f7a"))],
            &resources,
            &minifier,
        )
        .unwrap();

        assert!(matches!(outcomes[0], PluginOutcome::ProviderFallback { .. }));
        assert!(root.join("cachedPlugin/layaPlugin/index.js").exists());
    }

    #[test]
    fn test_provider_fallback_only_for_laya() {
        let (_temp, root, resources) = setup();
        add_bundle(&resources, "otherPlugin-wx1");
        let minifier = FakeMinifier::default();

        let outcomes = resolve_plugins(
            &root,
            &[PluginDescriptor::new("otherPlugin", None, Some("wx1"))],
            &resources,
            &minifier,
        )
        .unwrap();

        assert_eq!(
            outcomes[0],
            PluginOutcome::Unsupported {
                name: "otherPlugin".to_string()
            }
        );
        assert!(!root.join("cachedPlugin").exists());
    }

    #[test]
    fn test_unmatched_plugins_never_fail() {
        let (_temp, root, resources) = setup();
        let minifier = FakeMinifier {
            fail: true,
            ..Default::default()
        };

        let outcomes = resolve_plugins(
            &root,
            &[
                PluginDescriptor::new("unknownPlugin", Some("1.0"), None),
                PluginDescriptor::new("layaPlugin", None, None),
                PluginDescriptor::new("MinigameLoading", None, None),
            ],
            &resources,
            &minifier,
        )
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| !o.is_installed()));
        assert!(minifier.calls.borrow().is_empty());
    }

    #[test]
    fn test_minifier_failure_is_fatal() {
        let (_temp, root, resources) = setup();
        add_bundle(&resources, "MiniGameCommon");
        let minifier = FakeMinifier {
            fail: true,
            ..Default::default()
        };

        let err = resolve_plugins(
            &root,
            &[PluginDescriptor::new("MiniGameCommon", None, None)],
            &resources,
            &minifier,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::ExternalToolFailure { .. }));
    }

    #[test]
    fn test_engine_plugin_installed() {
        let (_temp, root, resources) = setup();
        let artifact = resources.engine_plugin_artifact();
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, "GameGlobal.pluginEnv = {};").unwrap();
        let minifier = FakeMinifier::default();

        let outcomes = resolve_plugins(
            &root,
            &[PluginDescriptor::new("UnityPlugin", Some("1.0"), None)],
            &resources,
            &minifier,
        )
        .unwrap();

        assert!(matches!(outcomes[0], PluginOutcome::EngineInstalled { .. }));
        assert_eq!(
            fs::read_to_string(engine_plugin_entry(&root)).unwrap(),
            "GameGlobal.pluginEnv = {};"
        );
        assert!(minifier.calls.borrow().is_empty());
    }

    #[test]
    fn test_engine_plugin_missing_artifact() {
        let (_temp, root, resources) = setup();
        let err = install_engine_plugin(&root, &resources).unwrap_err();
        assert!(matches!(err, ConvertError::MissingBuildArtifact { .. }));
    }

    #[test]
    fn test_bundle_destination_cleared() {
        let (_temp, root, resources) = setup();
        add_bundle(&resources, "MinigameLoading");
        let dest = root.join("cachedPlugin/MinigameLoading");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.js"), "old").unwrap();

        copy_plugin_bundle(
            &resources.plugin_cache().join("MinigameLoading"),
            &dest,
            &FakeMinifier::default(),
        )
        .unwrap();

        assert!(!dest.join("stale.js").exists());
        assert!(dest.join("index.js").exists());
    }
}
