//! Plugin Registry
//!
//! Adds, lists, removes and updates plugin checkouts under
//! `<data_dir>/plugins`. The directory tree is the only state: a plugin
//! exists exactly when its directory does.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::Config;
use crate::error::{Result, RtmError};
use crate::git::{Git, GitRepository};
use crate::install::paths::{plugin_downloads_dir, plugin_installs_dir};
use crate::plugin::index::PluginIndex;
use crate::plugin::types::{validate_name, Plugin, PluginInfo, UpdateOutcome};

/// Plugin Registry - manages plugin checkouts
pub struct PluginRegistry<G = Git> {
    config: Config,
    git: G,
}

impl PluginRegistry<Git> {
    /// Create a registry that shells out to `git`
    pub fn new(config: Config) -> Self {
        Self::with_git(config, Git::new())
    }
}

impl<G: GitRepository> PluginRegistry<G> {
    /// Create with a custom git collaborator (for testing)
    pub fn with_git(config: Config, git: G) -> Self {
        Self { config, git }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle for a validly named plugin; it may or may not be added yet
    pub fn plugin(&self, name: &str) -> Result<Plugin> {
        validate_name(name)?;
        Ok(Plugin::new(&self.config, name))
    }

    /// Handle for a plugin that must already be added
    pub fn existing(&self, name: &str) -> Result<Plugin> {
        let plugin = self.plugin(name)?;
        if !plugin.exists() {
            return Err(RtmError::PluginNotFound {
                name: name.to_string(),
            });
        }
        Ok(plugin)
    }

    /// Clone a plugin repository into `<data_dir>/plugins/<name>`.
    ///
    /// Without a URL the short-name plugin index is consulted. Fails with
    /// [`RtmError::PluginAlreadyExists`] if the directory is already there.
    pub fn add(&self, name: &str, repo_url: Option<&str>) -> Result<Plugin> {
        let plugin = self.plugin(name)?;

        if plugin.exists() {
            return Err(RtmError::PluginAlreadyExists {
                name: name.to_string(),
            });
        }
        if plugin.dir().exists() {
            return Err(RtmError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", plugin.dir().display()),
            )));
        }

        let url = match repo_url.filter(|url| !url.is_empty()) {
            Some(url) => url.to_string(),
            None => PluginIndex::new(&self.config, &self.git).repository_url(name)?,
        };

        clone_into_place(&self.config, &self.git, &url, plugin.dir())?;

        tracing::info!(plugin = name, url = %url, "added plugin");
        Ok(plugin)
    }

    /// All added plugins sorted by name.
    ///
    /// Git is only consulted for the attributes that were asked for.
    pub fn list(&self, include_urls: bool, include_refs: bool) -> Result<Vec<PluginInfo>> {
        let root = self.config.plugins_dir();
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            // Skip hidden entries and stray files
            if name.starts_with('.') || !entry.path().is_dir() {
                continue;
            }
            names.push(name);
        }
        names.sort();

        names
            .into_iter()
            .map(|name| -> Result<PluginInfo> {
                let plugin = Plugin::new(&self.config, name);

                let url = include_urls.then(|| plugin.url(&self.git));
                let git_ref = if include_refs {
                    Some(plugin.git_ref(&self.git)?)
                } else {
                    None
                };

                Ok(PluginInfo {
                    name: plugin.name().to_string(),
                    url,
                    git_ref,
                })
            })
            .collect()
    }

    /// Delete a plugin's checkout together with its installs and downloads
    pub fn remove(&self, name: &str) -> Result<()> {
        let plugin = self.existing(name)?;

        fs::remove_dir_all(plugin.dir())?;

        for dir in [
            plugin_installs_dir(&self.config, &plugin),
            plugin_downloads_dir(&self.config, &plugin),
        ] {
            if dir.exists() {
                fs::remove_dir_all(&dir)?;
            }
        }

        tracing::info!(plugin = name, "removed plugin");
        Ok(())
    }

    /// Fetch and check out `git_ref`, or the remote default branch tip.
    ///
    /// Returns the revision checked out afterwards.
    pub fn update(&self, name: &str, git_ref: Option<&str>) -> Result<String> {
        let plugin = self.existing(name)?;
        let dir = plugin.dir();

        self.git.fetch(dir)?;

        let target = match git_ref.filter(|r| !r.is_empty()) {
            Some(r) => r.to_string(),
            None => self.git.default_branch(dir)?,
        };
        self.git.checkout(dir, &target)?;

        let revision = plugin.git_ref(&self.git)?;
        tracing::info!(plugin = name, target = %target, revision = %revision, "updated plugin");
        Ok(revision)
    }

    /// Update every plugin to its default branch tip.
    ///
    /// One plugin failing never stops the others; each gets its own
    /// outcome, in list order. Only listing the plugins can fail the call.
    pub fn update_all(&self) -> Result<Vec<UpdateOutcome>> {
        let plugins = self.list(false, false)?;

        let outcomes = plugins
            .into_iter()
            .map(|info| {
                let result = self.update(&info.name, None);
                if let Err(e) = &result {
                    tracing::debug!(plugin = %info.name, error = %e, "plugin update failed");
                }
                UpdateOutcome {
                    name: info.name,
                    result,
                }
            })
            .collect();

        Ok(outcomes)
    }
}

/// Clone into a staging directory under `<data_dir>/tmp`, then rename the
/// finished checkout to `dest`. A failed clone leaves nothing at `dest`.
pub(crate) fn clone_into_place<G: GitRepository + ?Sized>(
    config: &Config,
    git: &G,
    url: &str,
    dest: &Path,
) -> Result<()> {
    let tmp = config.tmp_dir();
    fs::create_dir_all(&tmp)?;
    let staging = tempfile::Builder::new().prefix("clone-").tempdir_in(&tmp)?;
    let checkout = staging.path().join("checkout");

    git.clone_repo(url, &checkout)?;

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(&checkout, dest)?;

    tracing::debug!(url, dest = %dest.display(), "moved checkout into place");
    Ok(())
}
