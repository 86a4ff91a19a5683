//! Conversion pipeline
//!
//! Runs the ten stages in a fixed order against one [`ConversionContext`].
//! The first fatal error aborts the run; a declined confirmation ends it
//! early with [`PipelineOutcome::Cancelled`].

use std::path::PathBuf;

use crate::context::ConversionContext;
use crate::error::{ConvertError, Result};
use crate::prompt::Confirm;
use crate::settings::{Resources, Settings};
use crate::stages::package::PackReport;
use crate::stages::plugins::PluginOutcome;
use crate::stages::runtime::ENTRY_SCRIPT;
use crate::stages::wasm::PatchReport;
use crate::stages::{
    assets, config, coverview, package, paths, plugins, runtime, transpile, version, wasm,
};
use crate::tools::{CommandTool, ScriptMinifier, Transpiler};

/// Number of stages, for progress output
pub const STAGE_COUNT: usize = 10;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source: PathBuf,
    pub target: PathBuf,
    pub split_subpackages: bool,
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Resolved output directory
    pub output_dir: PathBuf,
    /// Converted project tree
    pub game_dir: PathBuf,
    pub config_path: PathBuf,
    pub coverview_customized: bool,
    pub plugins: Vec<PluginOutcome>,
    pub transpiled: bool,
    pub runtime_injected: bool,
    pub wasm: Option<PatchReport>,
    pub coverview_injected: bool,
    pub package: PackReport,
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(ConversionReport),
    /// The operator declined to overwrite an existing directory
    Cancelled,
}

/// The conversion driver and its collaborators
pub struct Pipeline {
    resources: Resources,
    confirm: Box<dyn Confirm>,
    minifier: Box<dyn ScriptMinifier>,
    transpiler: Box<dyn Transpiler>,
}

impl Pipeline {
    pub fn new(
        resources: Resources,
        confirm: Box<dyn Confirm>,
        minifier: Box<dyn ScriptMinifier>,
        transpiler: Box<dyn Transpiler>,
    ) -> Self {
        Self {
            resources,
            confirm,
            minifier,
            transpiler,
        }
    }

    /// Build a pipeline that shells out to the tools named in `settings`
    pub fn from_settings(settings: &Settings, resources: Resources, confirm: Box<dyn Confirm>) -> Self {
        let minifier = CommandTool::new("minifier", settings.minifier.clone());
        let transpiler = CommandTool::new("transpiler", settings.transpiler.clone())
            .with_babel_config(&resources.babel_config);
        Self::new(resources, confirm, Box::new(minifier), Box::new(transpiler))
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Run every stage in order
    pub fn run(&mut self, options: &PipelineOptions) -> Result<PipelineOutcome> {
        match self.run_stages(options) {
            Ok(report) => Ok(PipelineOutcome::Completed(report)),
            Err(ConvertError::Cancelled) => {
                tracing::info!("Operation cancelled by user");
                Ok(PipelineOutcome::Cancelled)
            }
            Err(e) => Err(e),
        }
    }

    fn run_stages(&mut self, options: &PipelineOptions) -> Result<ConversionReport> {
        stage(1, "Validating paths");
        let source = paths::resolve_source(&options.source)?;
        let target = paths::resolve_target(&options.target, self.confirm.as_mut())?;
        let mut ctx = ConversionContext::new(source, target, options.split_subpackages);
        let game = ctx.game_dir();

        stage(2, "Copying project files");
        assets::copy_assets(&ctx.source, &game, self.confirm.as_mut())?;

        stage(3, "Processing game configuration");
        let outcome = config::transform_config(&game)?;
        ctx.coverview_customized = outcome.coverview_customized;
        let game_config = &*ctx.config.insert(outcome.config);

        stage(4, "Injecting plugins");
        let declared = game_config.plugin_descriptors();
        let plugin_outcomes =
            plugins::resolve_plugins(&game, &declared, &self.resources, self.minifier.as_ref())?;

        stage(5, "Running transpiler");
        let transpiled = transpile::transpile(&game, self.transpiler.as_ref())?;

        stage(6, "Injecting runtime code");
        let entry = game.join(ENTRY_SCRIPT);
        if !entry.is_file() {
            return Err(ConvertError::MissingEntryScript(entry));
        }
        let runtime_injected = runtime::inject_runtime(&entry, &self.resources.injection_script())?;

        stage(7, "Processing WASM compatibility");
        let wasm_report = wasm::patch_wasm_split(&game)?;

        stage(8, "Processing coverviewCustomized settings");
        let coverview_injected = coverview::inject_coverview(&game, ctx.coverview_customized)?;

        stage(9, "Injecting version checker");
        version::stamp_version(&game, &self.resources)?;

        stage(10, "Creating distribution packages");
        if ctx.split_subpackages {
            tracing::info!("Packing main package and subpackages separately");
        } else {
            tracing::info!("Packing all files into main package");
        }
        let package_report = package::pack(&game, game_config, ctx.split_subpackages)?;

        Ok(ConversionReport {
            output_dir: ctx.target.clone(),
            game_dir: game,
            config_path: outcome.path,
            coverview_customized: ctx.coverview_customized,
            plugins: plugin_outcomes,
            transpiled,
            runtime_injected,
            wasm: wasm_report,
            coverview_injected,
            package: package_report,
        })
    }
}

/// Operator-facing progress line, e.g. `[3/10] Processing game configuration...`
fn stage_banner(index: usize, label: &str) -> String {
    format!("[{}/{}] {}...", index, STAGE_COUNT, label)
}

fn stage(index: usize, label: &str) {
    println!("\n{}", stage_banner(index, label));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::package::tests::archive_names;
    use crate::stages::paths::tests::ScriptedConfirm;
    use crate::stages::plugins::tests::FakeMinifier;
    use crate::stages::transpile::tests::FakeTranspiler;
    use serde_json::{json, Value};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn resources(root: &Path) -> Resources {
        let resources = Resources::new(root.join("tool"));
        fs::create_dir_all(resources.plugin_cache()).unwrap();
        fs::write(resources.injection_script(), "GameGlobal.unityNamespace = {};").unwrap();
        fs::write(resources.version_script(), "checkVersion();").unwrap();
        resources
    }

    fn export(root: &Path, game_json: &Value) -> PathBuf {
        let source = root.join("export");
        fs::create_dir_all(source.join("Assets")).unwrap();
        fs::create_dir_all(source.join("stage1")).unwrap();
        fs::write(source.join("game.json"), game_json.to_string()).unwrap();
        fs::write(source.join("game.js"), "require('./main');").unwrap();
        fs::write(source.join("Assets/hero.png"), "png").unwrap();
        fs::write(source.join("Assets/hero.png.meta"), "guid").unwrap();
        fs::write(source.join("stage1/level.js"), "level();").unwrap();
        source
    }

    fn pipeline(resources: Resources, answer: bool) -> Pipeline {
        Pipeline::new(
            resources,
            Box::new(ScriptedConfirm::new(answer)),
            Box::new(FakeMinifier::default()),
            Box::new(FakeTranspiler::default()),
        )
    }

    fn completed(outcome: PipelineOutcome) -> ConversionReport {
        match outcome {
            PipelineOutcome::Completed(report) => report,
            PipelineOutcome::Cancelled => panic!("pipeline was cancelled"),
        }
    }

    #[test]
    fn test_stage_banner() {
        assert_eq!(
            stage_banner(3, "Processing game configuration"),
            "[3/10] Processing game configuration..."
        );
    }

    #[test]
    fn test_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let source = export(temp_dir.path(), &json!({"orientation": "landscape", "plugins": {}}));
        let target = temp_dir.path().join("out");
        let mut pipeline = pipeline(resources(temp_dir.path()), false);

        let report = completed(
            pipeline
                .run(&PipelineOptions {
                    source,
                    target: target.clone(),
                    split_subpackages: false,
                })
                .unwrap(),
        );

        let game = target.join("game");
        let written: Value =
            serde_json::from_str(&fs::read_to_string(game.join("game.json")).unwrap()).unwrap();
        assert_eq!(written["deviceOrientation"], json!("landscape"));
        assert!(written.get("orientation").is_none());

        assert!(report.transpiled);
        assert!(report.runtime_injected);
        assert!(report.plugins.is_empty());
        assert_eq!(report.wasm, None);
        assert!(!report.coverview_injected);
        assert!(fs::read_to_string(game.join("game.js"))
            .unwrap()
            .starts_with("/* Unity Converter Injection */\n"));

        let main = report.package.main.unwrap();
        assert_eq!(main.path, target.join("game.zip"));
        assert_eq!(
            archive_names(&main.path),
            [
                "Assets/hero.png",
                "check-version.js",
                "game.js",
                "game.json",
                "stage1/level.js"
            ]
        );
    }

    #[test]
    fn test_split_mode_with_engine_plugin() {
        let temp_dir = TempDir::new().unwrap();
        let resources = resources(temp_dir.path());
        let artifact = resources.engine_plugin_artifact();
        fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        fs::write(&artifact, "plugin();").unwrap();

        let source = export(
            temp_dir.path(),
            &json!({
                "coverviewCustomized": true,
                "plugins": {"UnityPlugin": {"version": "1.0.0", "provider": "wx1"}},
                "subpackages": [{"name": "stage1", "root": "stage1/"}]
            }),
        );
        let target = temp_dir.path().join("out");
        let mut pipeline = pipeline(resources, false);

        let report = completed(
            pipeline
                .run(&PipelineOptions {
                    source,
                    target: target.clone(),
                    split_subpackages: true,
                })
                .unwrap(),
        );

        assert!(report.coverview_customized);
        assert!(report.coverview_injected);
        assert_eq!(
            fs::read_to_string(target.join("game/cachedPlugin/UnityPlugin/index.js")).unwrap(),
            "GameGlobal.pluginEnv.coverviewCustomized = true;\nplugin();"
        );

        let main = report.package.main.unwrap();
        assert!(archive_names(&main.path).iter().all(|n| !n.starts_with("stage1")));
        assert_eq!(
            archive_names(&target.join("subpkg/stage1.zip")),
            ["level.js"]
        );
    }

    #[test]
    fn test_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let mut pipeline = pipeline(resources(temp_dir.path()), true);

        let err = pipeline
            .run(&PipelineOptions {
                source: temp_dir.path().join("nope"),
                target: temp_dir.path().join("out"),
                split_subpackages: false,
            })
            .unwrap_err();
        assert!(matches!(err, ConvertError::PathNotFound(_)));
    }

    #[test]
    fn test_missing_entry_script() {
        let temp_dir = TempDir::new().unwrap();
        let source = export(temp_dir.path(), &json!({}));
        fs::remove_file(source.join("game.js")).unwrap();
        let mut pipeline = pipeline(resources(temp_dir.path()), true);

        let err = pipeline
            .run(&PipelineOptions {
                source,
                target: temp_dir.path().join("out"),
                split_subpackages: false,
            })
            .unwrap_err();
        assert!(matches!(err, ConvertError::MissingEntryScript(_)));
    }

    #[test]
    fn test_declined_overwrite_is_cancellation() {
        let temp_dir = TempDir::new().unwrap();
        let source = export(temp_dir.path(), &json!({}));
        let target = temp_dir.path().join("out");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("previous.zip"), "zip").unwrap();
        let mut pipeline = pipeline(resources(temp_dir.path()), false);

        let outcome = pipeline
            .run(&PipelineOptions {
                source,
                target: target.clone(),
                split_subpackages: false,
            })
            .unwrap();
        assert!(matches!(outcome, PipelineOutcome::Cancelled));
        assert!(target.join("previous.zip").exists());
    }
}
