//! External tool invocation
//!
//! The minifier and the transpiler are opaque subprocesses. The pipeline only
//! talks to them through [`ScriptMinifier`] and [`Transpiler`], so tests can
//! substitute in-process fakes.

use std::path::Path;
use std::process::Command;

use crate::error::{ConvertError, Result};
use crate::path_utils::path_to_string;
use crate::settings::ToolCommand;

/// Minifies one script file into a destination file
pub trait ScriptMinifier {
    fn minify(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Transpiles a whole directory tree in place
pub trait Transpiler {
    fn transpile(&self, root: &Path) -> Result<()>;
}

/// Runs a [`ToolCommand`] template as a blocking subprocess. stdout and stderr
/// are inherited so the operator sees the tool's own output.
#[derive(Debug, Clone)]
pub struct CommandTool {
    name: String,
    command: ToolCommand,
    babel_config: Option<String>,
}

impl CommandTool {
    pub fn new(name: &str, command: ToolCommand) -> Self {
        Self {
            name: name.to_string(),
            command,
            babel_config: None,
        }
    }

    /// Value substituted for `{babel_config}`
    pub fn with_babel_config(mut self, path: &Path) -> Self {
        self.babel_config = Some(path_to_string(path));
        self
    }

    /// Expand the argument template for one invocation
    fn expand_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let input = path_to_string(input);
        let output = path_to_string(output);
        let babel_config = self.babel_config.as_deref().unwrap_or(".babelrc");
        self.command
            .args
            .iter()
            .map(|arg| {
                arg.replace("{input}", &input)
                    .replace("{output}", &output)
                    .replace("{babel_config}", babel_config)
            })
            .collect()
    }

    fn run(&self, input: &Path, output: &Path) -> Result<()> {
        let args = self.expand_args(input, output);
        tracing::debug!("Running {}: {} {}", self.name, self.command.program, args.join(" "));

        let status = Command::new(&self.command.program)
            .args(&args)
            .status()
            .map_err(|e| ConvertError::ExternalToolFailure {
                tool: self.name.clone(),
                detail: format!("failed to start {}: {}", self.command.program, e),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::ExternalToolFailure {
                tool: self.name.clone(),
                detail: format!("{} exited with {}", self.command.program, status),
            })
        }
    }
}

impl ScriptMinifier for CommandTool {
    fn minify(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(input, output)
    }
}

impl Transpiler for CommandTool {
    fn transpile(&self, root: &Path) -> Result<()> {
        self.run(root, root)
    }
}
