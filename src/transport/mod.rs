//! How provisioning commands reach a target host.
//!
//! - [`Transport`] - run one shell command line on the target
//! - [`LocalTransport`] - the machine hostcook runs on
//! - [`SshTransport`] - a remote host through the `ssh` client

pub mod local;
pub mod ssh;

pub use local::LocalTransport;
pub use ssh::SshTransport;

use crate::error::Result;
use crate::shell::CommandResult;

/// Runs shell command lines on a target host.
///
/// Implementations return the command's outcome even when it exits
/// non-zero; only failures to run the command at all are errors.
pub trait Transport: Send + Sync {
    /// Run `command` through the target's `/bin/sh`, feeding `stdin` if given.
    fn run(&self, command: &str, stdin: Option<&[u8]>) -> Result<CommandResult>;

    /// Human-readable name of the target, for logs.
    fn target(&self) -> String;
}
