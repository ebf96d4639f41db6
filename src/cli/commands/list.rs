//! List command implementation.
//!
//! The `hostcook list` command lists recipes and computers.

use std::path::{Path, PathBuf};

use crate::config::ConfigPaths;
use crate::error::Result;
use crate::recipe::RecipeRegistry;
use crate::ui::UserInterface;

use super::dispatcher::{load_or_report, Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    paths: ConfigPaths,
}

impl ListCommand {
    pub fn new(project_root: &Path, paths: ConfigPaths) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            paths,
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_or_report(&self.project_root, &self.paths, ui)? {
            Ok(config) => config,
            Err(result) => return Ok(result),
        };

        ui.message("Recipes:");
        for name in RecipeRegistry::builtin().names() {
            ui.message(&format!("  {}", name));
        }

        ui.message("");
        ui.message("Computers:");
        let env = &config.environment;
        for name in env.computer_names() {
            let recipes = env.computer_recipes(name);
            let detail = if recipes.is_empty() {
                String::new()
            } else {
                format!(" [{}]", recipes.join(", "))
            };
            ui.message(&format!("  {} ({}){}", name, env.computer_host(name), detail));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn lists_recipes_and_computers() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".hostcook");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("environment.yml"),
            "computers:\n  web1:\n    host: 10.0.0.5\n    recipes: [example_com]\n  web2: {}\n",
        )
        .unwrap();

        let cmd = ListCommand::new(temp.path(), ConfigPaths::discover(temp.path()));
        let mut ui = MockUI::new();
        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("  example_com"));
        assert!(ui.has_message("web1 (10.0.0.5) [example_com]"));
        assert!(ui.has_message("web2 (web2)"));
    }

    #[test]
    fn missing_environment_exits_two() {
        let temp = TempDir::new().unwrap();
        let cmd = ListCommand::new(temp.path(), ConfigPaths::discover(temp.path()));
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
    }
}
