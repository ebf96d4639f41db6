//! SSH command transport.
//!
//! Commands are handed to the system `ssh` client in batch mode, so key
//! based authentication must already work for the target.

use std::path::PathBuf;

use super::Transport;
use crate::config::SshSettings;
use crate::error::Result;
use crate::shell::{execute_program, CommandOptions, CommandResult};

/// Runs commands on a remote host through `ssh`.
#[derive(Debug, Clone)]
pub struct SshTransport {
    host: String,
    user: Option<String>,
    port: Option<u16>,
    identity_file: Option<PathBuf>,
    options: Vec<String>,
}

impl SshTransport {
    /// Transport to `host` with ssh's own defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            port: None,
            identity_file: None,
            options: Vec::new(),
        }
    }

    /// Transport to `host` configured from settings.
    pub fn from_settings(host: impl Into<String>, settings: &SshSettings) -> Self {
        Self {
            host: host.into(),
            user: settings.user.clone(),
            port: settings.port,
            identity_file: settings.identity_file.clone(),
            options: settings.options.clone(),
        }
    }

    /// `[user@]host`
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }

    /// Arguments passed to `ssh` for one remote command.
    pub fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];

        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }

        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }

        for option in &self.options {
            args.push("-o".to_string());
            args.push(option.clone());
        }

        args.push(self.destination());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

impl Transport for SshTransport {
    fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<CommandResult> {
        tracing::debug!("{}$ {}", self.destination(), command);
        let options = CommandOptions {
            stdin: stdin.map(<[u8]>::to_vec),
            ..CommandOptions::captured()
        };
        execute_program("ssh", &self.ssh_args(command), &options)
    }

    fn target(&self) -> String {
        self.destination()
    }
}
