//! Shell-command provisioner.
//!
//! Every capability is expressed as a POSIX shell command line run through
//! a [`Transport`]. Arguments are quoted with [`quote`]. When `use_sudo` is
//! set, privileged commands are wrapped in `sudo -n sh -c '...'` so they
//! fail fast instead of waiting for a password.
//!
//! Queries (`id -u`, `test -L`, `sha256sum`) always run. Mutations are only
//! logged in dry-run mode.

use crate::error::{CookError, Result};
use crate::fileset::{RenderedFile, RenderedFileSet};
use crate::shell::{quote, CommandResult};
use crate::transport::Transport;

use super::{DirSpec, FileSetDeployer, Filesystem, Linking, PrivilegedExec, UserAdmin};

/// Provisioner that drives a transport with shell commands.
#[derive(Debug, Clone)]
pub struct ShellProvisioner<T: Transport> {
    transport: T,
    use_sudo: bool,
    dry_run: bool,
}

impl<T: Transport> ShellProvisioner<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            use_sudo: true,
            dry_run: false,
        }
    }

    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Wrap a command line for root execution.
    fn privileged(&self, command: &str) -> String {
        if self.use_sudo {
            format!("sudo -n sh -c {}", quote(command))
        } else {
            command.to_string()
        }
    }

    /// Run a read-only command; its exit status is the answer.
    fn query(&self, command: &str) -> Result<CommandResult> {
        self.transport.run(&self.privileged(command), None)
    }

    /// Run a state-changing command, failing on non-zero exit.
    fn mutate(&self, command: &str, stdin: Option<&[u8]>) -> Result<CommandResult> {
        if self.dry_run {
            tracing::warn!("[dry-run] {}: {}", self.transport.target(), command);
            return Ok(CommandResult::success(
                String::new(),
                String::new(),
                Default::default(),
            ));
        }

        tracing::debug!("{}: {}", self.transport.target(), command);
        self.transport
            .run(&self.privileged(command), stdin)?
            .into_checked(command)
    }

    fn remote_digest(&self, path: &str) -> Result<Option<String>> {
        let result = self.query(&format!("sha256sum {} 2>/dev/null", quote(path)))?;
        if !result.success {
            return Ok(None);
        }
        Ok(result.stdout.split_whitespace().next().map(str::to_string))
    }

    fn install_file(&self, file: &RenderedFile) -> Result<()> {
        let path = quote(&file.target);
        let mut command = String::new();
        if let Some(parent) = file.parent_dir() {
            command.push_str(&format!("mkdir -p {} && ", quote(parent)));
        }
        command.push_str(&format!(
            "cat > {path} && chmod {} {path}",
            file.mode_string()
        ));
        self.mutate(&command, Some(&file.contents))?;
        Ok(())
    }
}

impl<T: Transport> UserAdmin for ShellProvisioner<T> {
    fn user_exists(&self, name: &str) -> Result<bool> {
        let result = self
            .transport
            .run(&format!("id -u {} >/dev/null 2>&1", quote(name)), None)?;
        Ok(result.success)
    }

    fn user_create(&self, name: &str) -> Result<()> {
        tracing::info!("Creating user {}", name);
        self.mutate(
            &format!("useradd --create-home --shell /bin/bash {}", quote(name)),
            None,
        )?;
        Ok(())
    }

    fn user_disable_password(&self, name: &str) -> Result<()> {
        self.mutate(
            &format!("usermod -p \"$(openssl rand -base64 32)\" {}", quote(name)),
            None,
        )?;
        Ok(())
    }

    fn ssh_authorize(&self, user: &str, public_key: &str) -> Result<()> {
        let key = public_key.trim();
        if key.is_empty() || key.contains('\n') {
            return Err(CookError::Other(anyhow::anyhow!(
                "SSH public key for {} must be a single non-empty line",
                user
            )));
        }

        let user_q = quote(user);
        let key_q = quote(key);
        let command = format!(
            "home=$(getent passwd {user_q} | cut -d: -f6) && test -n \"$home\" \
             && mkdir -p \"$home/.ssh\" && touch \"$home/.ssh/authorized_keys\" \
             && (grep -qxF -e {key_q} \"$home/.ssh/authorized_keys\" \
             || printf '%s\\n' {key_q} >> \"$home/.ssh/authorized_keys\") \
             && chown -R {user_q}:{user_q} \"$home/.ssh\" \
             && chmod 700 \"$home/.ssh\" && chmod 600 \"$home/.ssh/authorized_keys\""
        );
        self.mutate(&command, None)?;
        Ok(())
    }
}

impl<T: Transport> Filesystem for ShellProvisioner<T> {
    fn dir_ensure(&self, spec: &DirSpec) -> Result<()> {
        let path = quote(&spec.path);
        let mut command = format!("mkdir -p {}", path);

        if let Some(mode) = &spec.mode {
            command.push_str(&format!(" && chmod {} {}", quote(mode), path));
        }

        match (&spec.owner, &spec.group) {
            (Some(owner), Some(group)) => {
                command.push_str(&format!(" && chown {}:{} {}", quote(owner), quote(group), path))
            }
            (Some(owner), None) => command.push_str(&format!(" && chown {} {}", quote(owner), path)),
            (None, Some(group)) => command.push_str(&format!(" && chgrp {} {}", quote(group), path)),
            (None, None) => {}
        }

        self.mutate(&command, None)?;
        Ok(())
    }
}

impl<T: Transport> Linking for ShellProvisioner<T> {
    fn is_link(&self, path: &str) -> Result<bool> {
        Ok(self.query(&format!("test -L {}", quote(path)))?.success)
    }

    fn link(&self, source: &str, dest: &str) -> Result<()> {
        let dest_q = quote(dest);
        let command = format!(
            "if [ -e {dest_q} ] && [ ! -L {dest_q} ]; then \
             printf '%s: destination exists and is not a link\\n' {dest_q} >&2; exit 1; fi; \
             ln -sfn {} {dest_q}",
            quote(source)
        );
        self.mutate(&command, None)?;
        Ok(())
    }
}

impl<T: Transport> PrivilegedExec for ShellProvisioner<T> {
    fn sudo(&self, command: &str) -> Result<CommandResult> {
        self.mutate(command, None)
    }
}

impl<T: Transport> FileSetDeployer for ShellProvisioner<T> {
    fn push_file_set(&self, files: &RenderedFileSet) -> Result<()> {
        let mut written = 0usize;

        for file in &files.files {
            if self.remote_digest(&file.target)?.as_deref() == Some(file.digest().as_str()) {
                tracing::debug!("Unchanged: {}", file.target);
                continue;
            }
            self.install_file(file)?;
            written += 1;
        }

        tracing::info!(
            "File set '{}': {} written, {} unchanged",
            files.name,
            written,
            files.len() - written
        );
        Ok(())
    }
}
