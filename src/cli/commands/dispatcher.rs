//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_project_config, ConfigPaths, ProjectConfig};
use crate::error::{CookError, Result};
use crate::runner::Operation;
use crate::ui::UserInterface;

/// Exit code for a missing configuration file.
pub const EXIT_CONFIG_MISSING: i32 = 2;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Load the project's configuration, reporting a missing file to the user.
///
/// `Ok(Err(result))` carries the exit result for a missing config file.
pub(crate) fn load_or_report(
    project_root: &Path,
    paths: &ConfigPaths,
    ui: &mut dyn UserInterface,
) -> Result<std::result::Result<ProjectConfig, CommandResult>> {
    match load_project_config(project_root, paths.clone()) {
        Ok(config) => Ok(Ok(config)),
        Err(CookError::ConfigNotFound { path }) => {
            ui.error(&format!(
                "No environment found at {}. Create .hostcook/environment.yml first.",
                path.display()
            ));
            Ok(Err(CommandResult::failure(EXIT_CONFIG_MISSING)))
        }
        Err(e) => Err(e),
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
    paths: ConfigPaths,
}

impl CommandDispatcher {
    /// Create a dispatcher using the default config locations under `project_root`.
    pub fn new(project_root: PathBuf) -> Self {
        let paths = ConfigPaths::discover(&project_root);
        Self {
            project_root,
            paths,
        }
    }

    /// Override config file locations.
    pub fn with_paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = paths;
        self
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let root = &self.project_root;
        let paths = self.paths.clone();
        match &cli.command {
            Commands::Apply(args) => {
                super::run::RunCommand::new(root, paths, Operation::Apply, args.clone())
                    .execute(ui)
            }
            Commands::Cleanup(args) => {
                super::run::RunCommand::new(root, paths, Operation::Cleanup, args.clone())
                    .execute(ui)
            }
            Commands::Check(args) => {
                super::check::CheckCommand::new(root, paths, args.clone()).execute(ui)
            }
            Commands::List => super::list::ListCommand::new(root, paths).execute(ui),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
        }
    }
}
