//! Check command implementation.
//!
//! `hostcook check` runs pre-apply checks only. Checks read the environment
//! and never touch the computer, so no connection is opened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::args::CheckArgs;
use crate::config::ConfigPaths;
use crate::error::Result;
use crate::provision::{Provisioner, ShellProvisioner};
use crate::runner::Operation;
use crate::transport::LocalTransport;
use crate::ui::UserInterface;

use super::dispatcher::{load_or_report, Command, CommandResult};
use super::run::{finish, run_recipes, select_recipes};

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    paths: ConfigPaths,
    args: CheckArgs,
}

impl CheckCommand {
    pub fn new(project_root: &Path, paths: ConfigPaths, args: CheckArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            paths,
            args,
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_or_report(&self.project_root, &self.paths, ui)? {
            Ok(config) => config,
            Err(result) => return Ok(result),
        };

        let computer = &self.args.computer;
        let names = select_recipes(&self.args.recipes, &config.environment, computer);
        if names.is_empty() {
            ui.error(&format!(
                "No recipes selected for {}. Pass --recipe or set `recipes` on the computer.",
                computer
            ));
            return Ok(CommandResult::failure(1));
        }

        ui.show_header(&format!("check {} on {}", names.join(", "), computer));

        // Dry-run so that a recipe reaching past its checks cannot mutate anything.
        let provisioner: Arc<dyn Provisioner> =
            Arc::new(ShellProvisioner::new(LocalTransport::new()).with_dry_run(true));
        let report = run_recipes(config, provisioner, &names, Operation::Check, computer, ui)?;
        Ok(finish(&report, ui))
    }
}
