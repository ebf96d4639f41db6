//! Configuration file discovery and loading.
//!
//! A project keeps its configuration under `.hostcook/`:
//!
//! - `.hostcook/settings.yml` (optional, defaults apply when absent)
//! - `.hostcook/environment.yml` (required)
//!
//! Either path can be overridden from the command line.

use crate::config::environment::Environment;
use crate::config::settings::Settings;
use crate::error::{CookError, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".hostcook";

const SETTINGS_FILE: &str = "settings.yml";
const ENVIRONMENT_FILE: &str = "environment.yml";

/// Resolved locations of the configuration files.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPaths {
    pub settings: PathBuf,
    pub environment: PathBuf,
}

impl ConfigPaths {
    /// Default locations for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(CONFIG_DIR);
        Self {
            settings: dir.join(SETTINGS_FILE),
            environment: dir.join(ENVIRONMENT_FILE),
        }
    }

    /// Apply command-line overrides on top of the discovered paths.
    pub fn with_overrides(mut self, settings: Option<&Path>, environment: Option<&Path>) -> Self {
        if let Some(path) = settings {
            self.settings = path.to_path_buf();
        }
        if let Some(path) = environment {
            self.environment = path.to_path_buf();
        }
        self
    }
}

/// Settings and environment for one project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub paths: ConfigPaths,
    pub settings: Settings,
    pub environment: Environment,
}

/// Find the project root by walking up to the first `.hostcook` directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Parse YAML content, treating an empty document as the type's default.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_yaml<T>(content: &str, source_path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(content).map_err(|e| CookError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CookError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CookError::Io(e)
        }
    })
}

/// Load settings, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<Settings> {
    match read_config(path) {
        Ok(content) => parse_yaml(&content, path),
        Err(CookError::ConfigNotFound { .. }) => {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}

/// Load the environment.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_environment(path: &Path) -> Result<Environment> {
    let content = read_config(path)?;
    parse_yaml(&content, path)
}

/// Load both configuration files for a project.
pub fn load_project_config(project_root: &Path, paths: ConfigPaths) -> Result<ProjectConfig> {
    let settings = load_settings(&paths.settings)?;
    let environment = load_environment(&paths.environment)?;

    tracing::debug!(
        "Loaded config from {} ({} computers)",
        project_root.display(),
        environment.computer_names().len()
    );

    Ok(ProjectConfig {
        root: project_root.to_path_buf(),
        paths,
        settings,
        environment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(environment: Option<&str>, settings: Option<&str>) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        if let Some(content) = environment {
            fs::write(dir.join(ENVIRONMENT_FILE), content).unwrap();
        }
        if let Some(content) = settings {
            fs::write(dir.join(SETTINGS_FILE), content).unwrap();
        }
        temp
    }

    #[test]
    fn find_project_root_walks_up() {
        let temp = project(None, None);
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(temp.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_none_without_config_dir() {
        let temp = TempDir::new().unwrap();
        // The tempdir's ancestors are system directories without .hostcook.
        assert_eq!(find_project_root(temp.path()), None);
    }

    #[test]
    fn overrides_replace_discovered_paths() {
        let paths = ConfigPaths::discover(Path::new("/proj"))
            .with_overrides(None, Some(Path::new("/tmp/env.yml")));
        assert_eq!(paths.settings, Path::new("/proj/.hostcook/settings.yml"));
        assert_eq!(paths.environment, Path::new("/tmp/env.yml"));
    }

    #[test]
    fn missing_settings_use_defaults() {
        let temp = project(Some("users: {}"), None);
        let config =
            load_project_config(temp.path(), ConfigPaths::discover(temp.path())).unwrap();
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn missing_environment_is_config_not_found() {
        let temp = project(None, Some("use_sudo: false"));
        let err =
            load_project_config(temp.path(), ConfigPaths::discover(temp.path())).unwrap_err();
        assert!(matches!(err, CookError::ConfigNotFound { .. }));
    }

    #[test]
    fn invalid_yaml_is_parse_error_with_path() {
        let temp = project(Some("users: [unclosed"), None);
        let err =
            load_project_config(temp.path(), ConfigPaths::discover(temp.path())).unwrap_err();
        match err {
            CookError::ConfigParseError { path, .. } => {
                assert!(path.ends_with("environment.yml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_environment_file_is_empty_environment() {
        let temp = project(Some("\n"), None);
        let env = load_environment(&temp.path().join(CONFIG_DIR).join(ENVIRONMENT_FILE)).unwrap();
        assert!(env.computer_names().is_empty());
    }

    #[test]
    fn loads_settings_values() {
        let temp = project(Some("computers: {web1: {}}"), Some("use_sudo: false\npackage_dir: pkgs"));
        let config =
            load_project_config(temp.path(), ConfigPaths::discover(temp.path())).unwrap();
        assert!(!config.settings.use_sudo);
        assert_eq!(config.settings.package_dir, PathBuf::from("pkgs"));
        assert_eq!(config.environment.computer_names(), vec!["web1"]);
    }
}
