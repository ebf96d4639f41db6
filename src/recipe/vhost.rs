//! Web vhost recipe.
//!
//! Sets up a system user that owns a web directory served by nginx:
//!
//! 1. create the user if missing and disable password login
//! 2. authorize the user's SSH public key
//! 3. ensure `/home/<user>/www` (mode 755, owned by the user)
//! 4. link it to `/srv/www/<user>`
//! 5. push the `<user>` file set with the computer's attributes
//! 6. link the site config into `sites-enabled`
//! 7. restart the web server
//!
//! Every creating step is guarded by a query, so applying twice is safe.

use std::sync::Arc;

use super::{Recipe, RecipeContext};
use crate::config::{Settings, USERS};
use crate::error::{CookError, Result};
use crate::provision::{DirSpec, Provisioner};
use crate::shell::quote;

/// Mode of the user's web directory.
pub const WEB_DIR_MODE: &str = "755";

/// Paths a vhost recipe manages on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhostLayout {
    /// Directory the user owns and deploys into.
    pub web_dir: String,
    /// Serving path nginx points at; a link to `web_dir`.
    pub serve_dir: String,
    /// Site config installed by the file set.
    pub site_available: String,
    /// Link that enables the site.
    pub site_enabled: String,
    /// Name of the file set to push.
    pub file_set: String,
}

impl VhostLayout {
    /// Standard layout for `username`.
    pub fn for_user(username: &str, settings: &Settings) -> Self {
        Self {
            web_dir: format!("/home/{}/www", username),
            serve_dir: format!("/srv/www/{}", username),
            site_available: settings
                .nginx
                .sites_available
                .join(username)
                .display()
                .to_string(),
            site_enabled: settings
                .nginx
                .sites_enabled
                .join(username)
                .display()
                .to_string(),
            file_set: username.to_string(),
        }
    }
}

/// A user-owned nginx virtual host.
pub struct VhostRecipe {
    name: String,
    username: String,
    layout: VhostLayout,
    context: Arc<RecipeContext>,
    provisioner: Arc<dyn Provisioner>,
}

impl VhostRecipe {
    /// Vhost for `username`, registered under the same name.
    pub fn new(
        username: &str,
        context: Arc<RecipeContext>,
        provisioner: Arc<dyn Provisioner>,
    ) -> Self {
        let layout = VhostLayout::for_user(username, context.settings());
        Self {
            name: username.to_string(),
            username: username.to_string(),
            layout,
            context,
            provisioner,
        }
    }

    /// The `example_com` site.
    pub fn example_com(context: Arc<RecipeContext>, provisioner: Arc<dyn Provisioner>) -> Self {
        Self::new("example_com", context, provisioner)
    }

    /// Replace the managed paths.
    pub fn with_layout(mut self, layout: VhostLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn layout(&self) -> &VhostLayout {
        &self.layout
    }

    fn public_key(&self) -> Result<&str> {
        self.context
            .environment()
            .attribute_str(USERS, &self.username, "ssh_public_key")
            .ok_or_else(|| {
                CookError::validation(
                    &self.name,
                    format!("{} user has no ssh_public_key", self.username),
                )
            })
    }

    fn ensure_user(&self) -> Result<()> {
        let p = self.provisioner.as_ref();
        if p.user_exists(&self.username)? {
            tracing::debug!("User {} already exists", self.username);
            return Ok(());
        }
        p.user_create(&self.username)?;
        p.user_disable_password(&self.username)
    }

    fn ensure_link(&self, source: &str, dest: &str) -> Result<()> {
        let p = self.provisioner.as_ref();
        if p.is_link(dest)? {
            tracing::debug!("{} is already a link", dest);
            return Ok(());
        }
        p.link(source, dest)
    }
}

impl Recipe for VhostRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn pre_apply_checks(&self, computer: &str) -> Result<()> {
        self.context.check_computer(&self.name, computer)?;

        if !self.context.environment().contains(USERS, &self.username) {
            return Err(CookError::validation(
                &self.name,
                format!("{} user not defined in environment", self.username),
            ));
        }

        self.public_key().map(|_| ())
    }

    fn apply(&self, computer: &str) -> Result<()> {
        let p = self.provisioner.as_ref();
        let layout = &self.layout;
        tracing::info!("Applying {} to {}", self.name, computer);

        self.ensure_user()?;
        p.ssh_authorize(&self.username, self.public_key()?)?;

        p.dir_ensure(
            &DirSpec::new(layout.web_dir.as_str())
                .mode(WEB_DIR_MODE)
                .owned_by(self.username.as_str(), self.username.as_str()),
        )?;
        self.ensure_link(&layout.web_dir, &layout.serve_dir)?;

        let params = self.context.computer_params(&self.name, computer)?;
        self.context
            .push_package_file_set(p, &layout.file_set, params)?;

        self.ensure_link(&layout.site_available, &layout.site_enabled)?;

        p.sudo(&self.context.settings().service_restart)?;
        Ok(())
    }

    fn cleanup(&self, computer: &str) -> Result<()> {
        let p = self.provisioner.as_ref();
        let serve_dir = &self.layout.serve_dir;

        if p.is_link(serve_dir)? {
            tracing::info!("{}: {} is a link, leaving it in place", computer, serve_dir);
            return Ok(());
        }

        tracing::info!("{}: removing {}", computer, serve_dir);
        p.sudo(&format!("rm -rf {}", quote(serve_dir)))?;
        Ok(())
    }
}
