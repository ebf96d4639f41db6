//! The provisioning capability set recipes are written against.
//!
//! Each capability is its own trait so a recipe's needs are explicit:
//!
//! - [`UserAdmin`] - system users and SSH key authorization
//! - [`Filesystem`] - directories with mode and ownership
//! - [`Linking`] - symbolic links
//! - [`PrivilegedExec`] - arbitrary commands as root
//! - [`FileSetDeployer`] - installing rendered file sets
//!
//! [`Provisioner`] bundles all five and is implemented automatically.
//! Recipes receive it as an injected `Arc<dyn Provisioner>`.
//!
//! Two implementations ship with the crate: [`ShellProvisioner`], which
//! drives a [`Transport`](crate::transport::Transport) with shell commands,
//! and [`MockProvisioner`], an in-memory recorder for tests.

pub mod mock;
pub mod shell;

pub use mock::{MockProvisioner, ProvisionCall};
pub use shell::ShellProvisioner;

use crate::error::Result;
use crate::fileset::RenderedFileSet;
use crate::shell::CommandResult;

/// Desired state of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSpec {
    pub path: String,
    /// Octal permission string, e.g. `"755"`.
    pub mode: Option<String>,
    pub owner: Option<String>,
    pub group: Option<String>,
}

impl DirSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: None,
            owner: None,
            group: None,
        }
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    /// Set both owner and group.
    pub fn owned_by(mut self, owner: impl Into<String>, group: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self.group = Some(group.into());
        self
    }
}

/// System user management.
pub trait UserAdmin {
    fn user_exists(&self, name: &str) -> Result<bool>;

    /// Create a user with a home directory. Fails if the user exists.
    fn user_create(&self, name: &str) -> Result<()>;

    /// Replace the user's password with an unguessable random one.
    fn user_disable_password(&self, name: &str) -> Result<()>;

    /// Add `public_key` to the user's `authorized_keys` unless already present.
    fn ssh_authorize(&self, user: &str, public_key: &str) -> Result<()>;
}

/// Directory management.
pub trait Filesystem {
    /// Create the directory if missing, then apply mode and ownership.
    fn dir_ensure(&self, spec: &DirSpec) -> Result<()>;
}

/// Symbolic link management.
pub trait Linking {
    /// Whether `path` is itself a symbolic link.
    fn is_link(&self, path: &str) -> Result<bool>;

    /// Make `dest` a symbolic link to `source`, replacing an existing link.
    /// Fails if `dest` exists and is not a link.
    fn link(&self, source: &str, dest: &str) -> Result<()>;
}

/// Privileged command execution.
pub trait PrivilegedExec {
    /// Run `command` as root. A non-zero exit is `CommandFailed`.
    fn sudo(&self, command: &str) -> Result<CommandResult>;
}

/// File set installation.
pub trait FileSetDeployer {
    fn push_file_set(&self, files: &RenderedFileSet) -> Result<()>;
}

/// The full capability set.
pub trait Provisioner:
    UserAdmin + Filesystem + Linking + PrivilegedExec + FileSetDeployer + Send + Sync
{
}

impl<T> Provisioner for T where
    T: UserAdmin + Filesystem + Linking + PrivilegedExec + FileSetDeployer + Send + Sync
{
}
