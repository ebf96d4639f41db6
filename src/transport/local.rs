//! Local command transport.

use std::path::PathBuf;

use super::Transport;
use crate::error::Result;
use crate::shell::{execute, CommandOptions, CommandResult};

/// Runs commands on this machine with `/bin/sh -c`.
#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    cwd: Option<PathBuf>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `cwd`.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
        }
    }
}

impl Transport for LocalTransport {
    fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<CommandResult> {
        tracing::debug!("local$ {}", command);
        let options = CommandOptions {
            cwd: self.cwd.clone(),
            stdin: stdin.map(<[u8]>::to_vec),
            ..CommandOptions::captured()
        };
        execute(command, &options)
    }

    fn target(&self) -> String {
        "localhost".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_command_and_captures_output() {
        let result = LocalTransport::new().run("echo ok", None).unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "ok");
    }

    #[test]
    fn non_zero_exit_is_not_an_error() {
        let result = LocalTransport::new().run("test -e /no/such/path", None).unwrap();
        assert!(!result.success);
    }

    #[test]
    fn pipes_stdin() {
        let result = LocalTransport::new().run("wc -c", Some(b"12345")).unwrap();
        assert_eq!(result.stdout.trim(), "5");
    }

    #[test]
    fn honours_working_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "").unwrap();
        let transport = LocalTransport::with_cwd(temp.path());
        assert!(transport.run("test -f marker", None).unwrap().success);
    }
}
