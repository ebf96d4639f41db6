//! Recipes: named, ordered sets of idempotent provisioning steps.
//!
//! - [`Recipe`] - the contract every recipe implements
//! - [`RecipeContext`] - settings and environment shared by all recipes
//! - [`VhostRecipe`] - a user-owned nginx virtual host
//! - [`RecipeRegistry`] - recipe constructors by name
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hostcook::config::{Environment, Settings, COMPUTERS};
//! use hostcook::provision::MockProvisioner;
//! use hostcook::recipe::{Recipe, RecipeContext, VhostRecipe};
//! use serde_json::json;
//!
//! let env = Environment::new().with_entity(COMPUTERS, "web1", json!({}));
//! let ctx = Arc::new(RecipeContext::new(Settings::default(), env, "."));
//! let recipe = VhostRecipe::example_com(ctx, Arc::new(MockProvisioner::new()));
//!
//! // The example_com user is missing from the environment.
//! assert!(recipe.pre_apply_checks("web1").is_err());
//! ```

pub mod registry;
pub mod vhost;

pub use registry::{RecipeFactory, RecipeRegistry};
pub use vhost::{VhostLayout, VhostRecipe};

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::config::{Environment, Settings, TemplateContext, COMPUTERS};
use crate::error::{CookError, Result};
use crate::fileset::FileSet;
use crate::provision::FileSetDeployer;

/// A host-configuration unit.
///
/// Callers run [`pre_apply_checks`](Recipe::pre_apply_checks) before
/// [`apply`](Recipe::apply); a failing check means nothing was changed.
pub trait Recipe {
    /// Registry name of the recipe.
    fn name(&self) -> &str;

    /// Validate the environment for `computer` without touching the host.
    fn pre_apply_checks(&self, computer: &str) -> Result<()>;

    /// Bring `computer` to the recipe's desired state. Safe to repeat.
    fn apply(&self, computer: &str) -> Result<()>;

    /// Undo what `apply` left behind.
    fn cleanup(&self, _computer: &str) -> Result<()> {
        Ok(())
    }
}

/// Settings and environment shared by every recipe in a run.
#[derive(Debug, Clone)]
pub struct RecipeContext {
    settings: Settings,
    environment: Environment,
    project_root: PathBuf,
}

impl RecipeContext {
    pub fn new(settings: Settings, environment: Environment, project_root: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            environment,
            project_root: project_root.into(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Directory holding file sets, resolved against the project root.
    pub fn package_dir(&self) -> PathBuf {
        self.project_root.join(&self.settings.package_dir)
    }

    /// Base pre-apply check shared by all recipes: the computer is known.
    pub fn check_computer(&self, recipe: &str, computer: &str) -> Result<()> {
        if self.environment.contains(COMPUTERS, computer) {
            Ok(())
        } else {
            Err(CookError::validation(
                recipe,
                format!("{} computer not defined in environment", computer),
            ))
        }
    }

    /// Standard file set parameters for a computer:
    /// `{"name": <computer>, "computer": <its attributes>}`.
    pub fn computer_params(&self, recipe: &str, computer: &str) -> Result<Value> {
        let attributes = self.environment.computer(computer).ok_or_else(|| {
            CookError::validation(recipe, format!("{} computer not defined in environment", computer))
        })?;
        Ok(json!({
            "name": computer,
            "computer": attributes,
        }))
    }

    /// Load, render and push the file set `name` with `params`.
    pub fn push_package_file_set<D>(&self, deployer: &D, name: &str, params: Value) -> Result<()>
    where
        D: FileSetDeployer + ?Sized,
    {
        let set = FileSet::load(&self.package_dir(), name)?;
        let rendered = set.render(&TemplateContext::new(params))?;
        tracing::info!("Pushing file set '{}' ({} files)", name, rendered.len());
        deployer.push_file_set(&rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::{MockProvisioner, ProvisionCall};
    use std::fs;

    fn context(root: &Path) -> RecipeContext {
        let env = Environment::new().with_entity(COMPUTERS, "web1", json!({"ip": "10.0.0.5"}));
        RecipeContext::new(Settings::default(), env, root)
    }

    #[test]
    fn check_computer_rejects_unknown() {
        let ctx = context(Path::new("."));
        assert!(ctx.check_computer("r", "web1").is_ok());
        let err = ctx.check_computer("r", "db9").unwrap_err();
        assert!(matches!(err, CookError::RecipeValidation { .. }));
        assert!(err.to_string().contains("db9"));
    }

    #[test]
    fn computer_params_shape() {
        let ctx = context(Path::new("."));
        let params = ctx.computer_params("r", "web1").unwrap();
        assert_eq!(params, json!({"name": "web1", "computer": {"ip": "10.0.0.5"}}));
    }

    #[test]
    fn package_dir_is_relative_to_project_root() {
        let ctx = context(Path::new("/proj"));
        assert_eq!(ctx.package_dir(), PathBuf::from("/proj/packages"));
    }

    #[test]
    fn push_package_file_set_renders_and_deploys() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("packages/site/etc");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("hosts.tmpl"), "${computer.ip} ${name}\n").unwrap();

        let ctx = context(temp.path());
        let prov = MockProvisioner::new();
        let params = ctx.computer_params("r", "web1").unwrap();
        ctx.push_package_file_set(&prov, "site", params).unwrap();

        assert_eq!(prov.file("/etc/hosts"), Some(b"10.0.0.5 web1\n".to_vec()));
        assert_eq!(
            prov.calls(),
            vec![ProvisionCall::PushFileSet {
                name: "site".into(),
                files: 1
            }]
        );
    }
}
