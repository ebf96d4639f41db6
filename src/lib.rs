//! hostcook - idempotent host-configuration recipes.
//!
//! A recipe is a named set of provisioning steps (create a user, authorize an
//! SSH key, link directories, push a file set, restart a service) applied to a
//! computer from an environment description. Every step checks current state
//! first, so applying a recipe twice is safe.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings, environment and template interpolation
//! - [`error`] - Error types and result aliases
//! - [`fileset`] - File sets: loading, rendering and digests
//! - [`provision`] - Host capabilities recipes are written against
//! - [`recipe`] - The recipe contract and the built-in recipes
//! - [`runner`] - Ordered execution of recipes against a computer
//! - [`shell`] - Shell command execution and quoting
//! - [`transport`] - Where provisioning commands run (local or SSH)
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hostcook::config::{Environment, Settings, COMPUTERS};
//! use hostcook::provision::MockProvisioner;
//! use hostcook::recipe::{RecipeContext, RecipeRegistry};
//! use hostcook::runner::{Operation, RecipeRunner};
//! use serde_json::json;
//!
//! let env = Environment::new().with_entity(COMPUTERS, "web1", json!({}));
//! let ctx = Arc::new(RecipeContext::new(Settings::default(), env, "."));
//! let prov: Arc<dyn hostcook::provision::Provisioner> = Arc::new(MockProvisioner::new());
//!
//! let recipes = RecipeRegistry::builtin()
//!     .create_all(&["example_com".to_string()], &ctx, &prov)
//!     .unwrap();
//! let report = RecipeRunner::new(&recipes).run(Operation::Check, "web1");
//!
//! // No example_com user in the environment.
//! assert!(!report.success());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fileset;
pub mod provision;
pub mod recipe;
pub mod runner;
pub mod shell;
pub mod transport;
pub mod ui;

pub use error::{CookError, Result};
