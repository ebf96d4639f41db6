//! Settings schema.
//!
//! Settings are passed through to every recipe via the recipe context.
//! Recipes do not interpret them directly; the file set loader, the
//! transports, and the shell provisioner do.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level settings loaded from `.hostcook/settings.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory holding file sets, relative to the project root.
    pub package_dir: PathBuf,

    /// Prefix privileged commands with `sudo`.
    pub use_sudo: bool,

    /// SSH transport parameters.
    pub ssh: SshSettings,

    /// Web server site directories.
    pub nginx: NginxSettings,

    /// Command used to restart the web server.
    pub service_restart: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            package_dir: PathBuf::from("packages"),
            use_sudo: true,
            ssh: SshSettings::default(),
            nginx: NginxSettings::default(),
            service_restart: "service nginx restart".to_string(),
        }
    }
}

/// SSH connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SshSettings {
    /// Remote login user (ssh default when unset).
    pub user: Option<String>,

    /// Remote port (ssh default when unset).
    pub port: Option<u16>,

    /// Private key passed with `-i`.
    pub identity_file: Option<PathBuf>,

    /// Extra `-o` options, e.g. `StrictHostKeyChecking=accept-new`.
    pub options: Vec<String>,
}

/// Locations of the nginx site directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NginxSettings {
    pub sites_available: PathBuf,
    pub sites_enabled: PathBuf,
}

impl Default for NginxSettings {
    fn default() -> Self {
        Self {
            sites_available: PathBuf::from("/etc/nginx/sites-available"),
            sites_enabled: PathBuf::from("/etc/nginx/sites-enabled"),
        }
    }
}
