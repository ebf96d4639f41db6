//! Apply and cleanup commands.
//!
//! `hostcook apply` and `hostcook cleanup` share everything but the
//! [`Operation`] they hand to the runner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::TargetArgs;
use crate::config::{ConfigPaths, Environment, ProjectConfig, Settings, COMPUTERS};
use crate::error::Result;
use crate::provision::{Provisioner, ShellProvisioner};
use crate::recipe::{RecipeContext, RecipeRegistry};
use crate::runner::{Operation, RecipeRunner, RecipeStatus, RunProgress, RunReport};
use crate::transport::{LocalTransport, SshTransport};
use crate::ui::{format_duration, UserInterface};

use super::dispatcher::{load_or_report, Command, CommandResult};

/// The apply/cleanup command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    paths: ConfigPaths,
    operation: Operation,
    args: TargetArgs,
}

impl RunCommand {
    pub fn new(project_root: &Path, paths: ConfigPaths, operation: Operation, args: TargetArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            paths,
            operation,
            args,
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Build the provisioner for the selected target.
    fn provisioner(&self, settings: &Settings, environment: &Environment) -> Arc<dyn Provisioner> {
        if self.args.local {
            tracing::debug!("Using local transport");
            return Arc::new(
                ShellProvisioner::new(LocalTransport::new())
                    .with_sudo(settings.use_sudo)
                    .with_dry_run(self.args.dry_run),
            );
        }

        let host = self
            .args
            .host
            .clone()
            .unwrap_or_else(|| environment.computer_host(&self.args.computer).to_string());
        tracing::debug!("Using SSH transport to {}", host);
        Arc::new(
            ShellProvisioner::new(SshTransport::from_settings(host, &settings.ssh))
                .with_sudo(settings.use_sudo)
                .with_dry_run(self.args.dry_run),
        )
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_or_report(&self.project_root, &self.paths, ui)? {
            Ok(config) => config,
            Err(result) => return Ok(result),
        };

        let computer = &self.args.computer;
        if !config.environment.contains(COMPUTERS, computer) {
            ui.error(&format!("Unknown computer: {}", computer));
            return Ok(CommandResult::failure(1));
        }

        let names = select_recipes(&self.args.recipes, &config.environment, computer);
        if names.is_empty() {
            ui.error(&format!(
                "No recipes selected for {}. Pass --recipe or set `recipes` on the computer.",
                computer
            ));
            return Ok(CommandResult::failure(1));
        }

        ui.show_header(&format!("{} {} on {}", self.operation, names.join(", "), computer));
        if self.args.dry_run {
            ui.message("Dry run: mutating commands are logged, not executed");
        }

        let provisioner = self.provisioner(&config.settings, &config.environment);
        let report = run_recipes(config, provisioner, &names, self.operation, computer, ui)?;
        Ok(finish(&report, ui))
    }
}

/// Recipes named on the command line, else the computer's `recipes` list.
pub(crate) fn select_recipes(requested: &[String], environment: &Environment, computer: &str) -> Vec<String> {
    if requested.is_empty() {
        environment.computer_recipes(computer)
    } else {
        requested.to_vec()
    }
}

/// Instantiate `names` and run `operation`, streaming progress to `ui`.
pub(crate) fn run_recipes(
    config: ProjectConfig,
    provisioner: Arc<dyn Provisioner>,
    names: &[String],
    operation: Operation,
    computer: &str,
    ui: &mut dyn UserInterface,
) -> Result<RunReport> {
    let context = Arc::new(RecipeContext::new(
        config.settings,
        config.environment,
        config.root,
    ));
    let recipes = RecipeRegistry::builtin().create_all(names, &context, &provisioner)?;
    let runner = RecipeRunner::new(&recipes);

    let show_detail = ui.output_mode().shows_detail();
    let report = runner.run_with_progress(operation, computer, |progress| match progress {
        RunProgress::Checking { name } => {
            ui.message(&format!("  Checking {}...", name));
        }
        RunProgress::Starting { name, index, total } => {
            ui.show_progress(index, total, name);
        }
        RunProgress::Finished { outcome } => {
            let duration = format_duration(outcome.duration);
            match outcome.status {
                RecipeStatus::Failed => {
                    ui.error(&format!("  {} failed ({})", outcome.name, duration));
                }
                _ if show_detail => {
                    ui.success(&format!("  {} ({})", outcome.name, duration));
                }
                _ => ui.success(&format!("  {}", outcome.name)),
            }
        }
    });

    Ok(report)
}

/// Report the run's final result and map it to an exit code.
pub(crate) fn finish(report: &RunReport, ui: &mut dyn UserInterface) -> CommandResult {
    match &report.error {
        None => {
            let count = report.recipes.len();
            let label = if count == 1 { "recipe" } else { "recipes" };
            ui.success(&format!(
                "{} complete on {} ({} {}, {})",
                report.operation,
                report.computer,
                count,
                label,
                format_duration(report.duration)
            ));
            CommandResult::success()
        }
        Some(err) => {
            let recipe = report.failed_recipe().unwrap_or("run");
            ui.error(&format!("{}: {}", recipe, err));
            CommandResult::failure(1)
        }
    }
}
