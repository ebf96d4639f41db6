//! Configuration loading and template interpolation.
//!
//! This module handles:
//! - Settings schema in [`settings`]
//! - The provisioning environment in [`environment`]
//! - File discovery and loading in [`loader`]
//! - `${var}` interpolation for file set templates in [`interpolation`]
//!
//! # Example
//!
//! ```
//! use hostcook::config::{load_project_config, ConfigPaths};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".hostcook");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("environment.yml"), "computers:\n  web1: {}\n").unwrap();
//!
//! let config = load_project_config(temp.path(), ConfigPaths::discover(temp.path())).unwrap();
//! assert_eq!(config.environment.computer_names(), vec!["web1"]);
//! assert!(config.settings.use_sudo);
//! ```

pub mod environment;
pub mod interpolation;
pub mod loader;
pub mod settings;

pub use environment::{EntityMap, Environment, COMPUTERS, USERS};
pub use interpolation::{parse_interpolation, resolve_string, Segment, TemplateContext};
pub use loader::{
    find_project_root, load_environment, load_project_config, load_settings, parse_yaml,
    ConfigPaths, ProjectConfig, CONFIG_DIR,
};
pub use settings::{NginxSettings, Settings, SshSettings};
