//! Mock provisioner for testing.
//!
//! `MockProvisioner` keeps users, keys, directories, links and files in
//! memory and records every state-changing call for later assertion.
//!
//! It is stricter than a real host: creating a user that exists, or linking
//! onto a path that is already a link or directory, fails. Recipes must
//! guard those steps with the matching query to stay idempotent.
//!
//! # Example
//!
//! ```
//! use hostcook::provision::{Linking, MockProvisioner, ProvisionCall, UserAdmin};
//!
//! let prov = MockProvisioner::new().with_user("deploy");
//! assert!(prov.user_exists("deploy").unwrap());
//! assert!(prov.user_create("deploy").is_err());
//!
//! prov.link("/home/deploy/www", "/srv/www/deploy").unwrap();
//! assert!(prov.is_link("/srv/www/deploy").unwrap());
//! assert_eq!(
//!     prov.calls(),
//!     vec![
//!         ProvisionCall::UserCreate("deploy".into()),
//!         ProvisionCall::Link {
//!             source: "/home/deploy/www".into(),
//!             dest: "/srv/www/deploy".into(),
//!         },
//!     ]
//! );
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use crate::error::{CookError, Result};
use crate::fileset::RenderedFileSet;
use crate::shell::CommandResult;

use super::{DirSpec, FileSetDeployer, Filesystem, Linking, PrivilegedExec, UserAdmin};

/// A state-changing call made against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionCall {
    UserCreate(String),
    DisablePassword(String),
    SshAuthorize { user: String, key: String },
    DirEnsure(DirSpec),
    Link { source: String, dest: String },
    Sudo(String),
    PushFileSet { name: String, files: usize },
}

impl ProvisionCall {
    /// Whether this call creates something that did not exist.
    pub fn is_creation(&self) -> bool {
        matches!(self, Self::UserCreate(_) | Self::Link { .. })
    }
}

#[derive(Debug, Default)]
struct MockState {
    users: BTreeSet<String>,
    keys: BTreeMap<String, Vec<String>>,
    dirs: BTreeMap<String, DirSpec>,
    links: BTreeMap<String, String>,
    files: BTreeMap<String, Vec<u8>>,
    failing_commands: BTreeSet<String>,
    calls: Vec<ProvisionCall>,
}

/// In-memory provisioner that records its calls.
#[derive(Debug, Default)]
pub struct MockProvisioner {
    state: Mutex<MockState>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing user.
    pub fn with_user(self, name: &str) -> Self {
        self.lock().users.insert(name.to_string());
        self
    }

    /// Start with an existing real directory.
    pub fn with_directory(self, path: &str) -> Self {
        self.lock()
            .dirs
            .insert(path.to_string(), DirSpec::new(path));
        self
    }

    /// Start with an existing symbolic link.
    pub fn with_link(self, source: &str, dest: &str) -> Self {
        self.lock()
            .links
            .insert(dest.to_string(), source.to_string());
        self
    }

    /// Make `sudo(command)` exit non-zero.
    pub fn failing_command(self, command: &str) -> Self {
        self.lock().failing_commands.insert(command.to_string());
        self
    }

    /// Every state-changing call, in order.
    pub fn calls(&self) -> Vec<ProvisionCall> {
        self.lock().calls.clone()
    }

    /// Forget recorded calls but keep state.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.lock().users.contains(name)
    }

    pub fn authorized_keys(&self, user: &str) -> Vec<String> {
        self.lock().keys.get(user).cloned().unwrap_or_default()
    }

    pub fn directory(&self, path: &str) -> Option<DirSpec> {
        self.lock().dirs.get(path).cloned()
    }

    pub fn link_target(&self, dest: &str) -> Option<String> {
        self.lock().links.get(dest).cloned()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    /// Commands passed to `sudo`, in order.
    pub fn sudo_commands(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ProvisionCall::Sudo(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock only happens inside a failing test.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn failed(command: String, stderr: String) -> CookError {
    CookError::CommandFailed {
        command,
        code: Some(1),
        stderr,
    }
}

impl UserAdmin for MockProvisioner {
    fn user_exists(&self, name: &str) -> Result<bool> {
        Ok(self.lock().users.contains(name))
    }

    fn user_create(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(ProvisionCall::UserCreate(name.to_string()));
        if !state.users.insert(name.to_string()) {
            return Err(failed(
                format!("useradd {}", name),
                format!("useradd: user '{}' already exists", name),
            ));
        }
        Ok(())
    }

    fn user_disable_password(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state
            .calls
            .push(ProvisionCall::DisablePassword(name.to_string()));
        if !state.users.contains(name) {
            return Err(failed(
                format!("usermod -p <random> {}", name),
                format!("usermod: user '{}' does not exist", name),
            ));
        }
        Ok(())
    }

    fn ssh_authorize(&self, user: &str, public_key: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(ProvisionCall::SshAuthorize {
            user: user.to_string(),
            key: public_key.to_string(),
        });
        let keys = state.keys.entry(user.to_string()).or_default();
        if !keys.iter().any(|k| k == public_key) {
            keys.push(public_key.to_string());
        }
        Ok(())
    }
}

impl Filesystem for MockProvisioner {
    fn dir_ensure(&self, spec: &DirSpec) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(ProvisionCall::DirEnsure(spec.clone()));
        state.dirs.insert(spec.path.clone(), spec.clone());
        Ok(())
    }
}

impl Linking for MockProvisioner {
    fn is_link(&self, path: &str) -> Result<bool> {
        Ok(self.lock().links.contains_key(path))
    }

    fn link(&self, source: &str, dest: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(ProvisionCall::Link {
            source: source.to_string(),
            dest: dest.to_string(),
        });
        if state.links.contains_key(dest) || state.dirs.contains_key(dest) {
            return Err(failed(
                format!("ln -s {} {}", source, dest),
                format!("ln: failed to create symbolic link '{}': File exists", dest),
            ));
        }
        state.links.insert(dest.to_string(), source.to_string());
        Ok(())
    }
}

impl PrivilegedExec for MockProvisioner {
    fn sudo(&self, command: &str) -> Result<CommandResult> {
        let mut state = self.lock();
        state.calls.push(ProvisionCall::Sudo(command.to_string()));

        if state.failing_commands.contains(command) {
            return Err(failed(command.to_string(), String::new()));
        }

        if let Some(path) = command.strip_prefix("rm -rf ") {
            let path = path.trim();
            let nested = format!("{}/", path);
            state
                .dirs
                .retain(|p, _| p != path && !p.starts_with(&nested));
            state.links.remove(path);
            state
                .files
                .retain(|p, _| !p.starts_with(&nested));
        }

        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Default::default(),
        ))
    }
}

impl FileSetDeployer for MockProvisioner {
    fn push_file_set(&self, files: &RenderedFileSet) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(ProvisionCall::PushFileSet {
            name: files.name.clone(),
            files: files.len(),
        });
        for file in &files.files {
            state.files.insert(file.target.clone(), file.contents.clone());
        }
        Ok(())
    }
}
