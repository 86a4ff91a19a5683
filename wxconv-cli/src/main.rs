//! wxconv CLI
//!
//! Command-line interface for converting an exported game build into a
//! WeChat mini-game package.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use wxconv_core::{
    is_affirmative, AssumeYes, Confirm, ConversionReport, Pipeline, PipelineOptions,
    PipelineOutcome, PluginOutcome, Settings, CONVERTER_VERSION,
};

#[derive(Parser)]
#[command(name = "wxconv")]
#[command(about = "Convert an exported game build into a WeChat mini-game package")]
#[command(version)]
struct Cli {
    /// Path to the exported project
    #[arg(short, long)]
    source: PathBuf,

    /// Output directory (receives game/, game.zip and subpkg/)
    #[arg(short, long)]
    target: PathBuf,

    /// Pack main package and subpackages separately (bare flag means true)
    #[arg(
        long,
        visible_alias = "sp",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    subpackage: Option<String>,

    /// Answer yes to every overwrite prompt
    #[arg(short, long)]
    yes: bool,

    /// Open the output directory when done
    #[arg(long)]
    open: bool,

    /// Settings file (default: wxconv.toml next to the executable)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding wx_unity_converter/ and libs/ (default: from settings)
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Asks on the terminal; anything but `y` declines
struct StdinPrompt;

impl Confirm for StdinPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{} [y/N] ", question);
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(e) => {
                tracing::warn!("Failed to read answer: {}", e);
                false
            }
        }
    }
}

/// `--subpackage` value: `true`, `yes` and `y` enable split packaging
fn parse_subpackage_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "yes" | "y"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let directive = if cli.verbose { "wxconv=debug" } else { "wxconv=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    println!("\n=== WeChat Mini Game Converter v{} ===", CONVERTER_VERSION);

    let (settings, settings_path) =
        Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    match &settings_path {
        Some(path) => tracing::info!("Loaded settings from {}", path.display()),
        None => tracing::debug!("No settings file found, using defaults"),
    }

    let resources = settings.resources(cli.resources.as_deref());
    tracing::debug!("Resources directory: {}", resources.root.display());

    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompt)
    };

    let split_subpackages = parse_subpackage_flag(cli.subpackage.as_deref());
    let options = PipelineOptions {
        source: cli.source,
        target: cli.target,
        split_subpackages,
    };

    let mut pipeline = Pipeline::from_settings(&settings, resources, confirm);
    match pipeline.run(&options).context("Conversion failed")? {
        PipelineOutcome::Cancelled => {
            println!("Operation cancelled by user");
        }
        PipelineOutcome::Completed(report) => {
            print_summary(&report);
            if cli.open {
                open_folder(&report.output_dir);
            }
        }
    }

    Ok(())
}

fn print_summary(report: &ConversionReport) {
    println!("\n[DONE] Conversion completed successfully!");

    if !report.plugins.is_empty() {
        println!("\nPlugins:");
        for outcome in &report.plugins {
            let line = match outcome {
                PluginOutcome::EngineInstalled { name } => format!("{} (prebuilt)", name),
                PluginOutcome::Copied { name, .. } => name.clone(),
                PluginOutcome::MockSubstituted { name, .. } => format!("{} (mock)", name),
                PluginOutcome::ProviderFallback { name, .. } => {
                    format!("{} (matched by provider, may not work)", name)
                }
                PluginOutcome::Unsupported { name } => format!("{} (ignored)", name),
            };
            println!("  {}", line);
        }
    }

    if let Some(wasm) = &report.wasm {
        println!("\nWASM loader: {} of {} patterns modified", wasm.modified, wasm.total);
    }

    println!("\nPackages:");
    if let Some(main) = &report.package.main {
        println!("  {} ({} files)", main.path.display(), main.entries);
    }
    for (name, archive) in &report.package.subpackages {
        println!("  {} -> {} ({} files)", name, archive.path.display(), archive.entries);
    }
    for name in &report.package.skipped {
        println!("  {} (skipped, root not found)", name);
    }

    println!("\nOutput directory: {}", report.output_dir.display());
}

/// Open `path` in the platform file browser
fn open_folder(path: &Path) {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    if let Err(e) = std::process::Command::new(program).arg(path).spawn() {
        tracing::warn!("Failed to open {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subpackage_flag() {
        assert!(parse_subpackage_flag(Some("true")));
        assert!(parse_subpackage_flag(Some("YES")));
        assert!(parse_subpackage_flag(Some("y")));
        assert!(!parse_subpackage_flag(Some("false")));
        assert!(!parse_subpackage_flag(Some("1")));
        assert!(!parse_subpackage_flag(None));
    }

    #[test]
    fn test_bare_subpackage_flag() {
        let cli = Cli::try_parse_from(["wxconv", "-s", "in", "-t", "out", "--subpackage"]).unwrap();
        assert_eq!(cli.subpackage.as_deref(), Some("true"));

        let cli = Cli::try_parse_from(["wxconv", "-s", "in", "-t", "out", "--sp", "no"]).unwrap();
        assert!(!parse_subpackage_flag(cli.subpackage.as_deref()));

        let cli = Cli::try_parse_from(["wxconv", "-s", "in", "-t", "out"]).unwrap();
        assert_eq!(cli.subpackage, None);
    }

    #[test]
    fn test_source_and_target_required() {
        assert!(Cli::try_parse_from(["wxconv", "-s", "in"]).is_err());
        assert!(Cli::try_parse_from(["wxconv", "-t", "out"]).is_err());
    }
}
