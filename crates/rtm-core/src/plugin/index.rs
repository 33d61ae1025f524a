//! Plugin short-name index
//!
//! `rtm plugin add <name>` without a URL looks the name up in a git
//! repository of plugin definitions. Each definition is a file
//! `plugins/<name>` containing a line `repository = <git-url>`.
//!
//! ```text
//! <data_dir>/plugin-index/           # checkout of plugin_repository_url
//! └── plugins/
//!     ├── lua                        # repository = https://...
//!     └── ruby
//! <data_dir>/tmp/plugin-index-last-sync   # RFC 3339 timestamp
//! ```

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::{Result, RtmError};
use crate::git::GitRepository;
use crate::plugin::registry::clone_into_place;

const INDEX_DIR: &str = "plugin-index";
const LAST_SYNC_FILE: &str = "plugin-index-last-sync";

/// Read access to the short-name plugin index
pub struct PluginIndex<'a, G: ?Sized> {
    config: &'a Config,
    git: &'a G,
}

impl<'a, G: GitRepository + ?Sized> PluginIndex<'a, G> {
    pub fn new(config: &'a Config, git: &'a G) -> Self {
        Self { config, git }
    }

    /// Checkout location of the index repository
    pub fn dir(&self) -> PathBuf {
        self.config.data_dir.join(INDEX_DIR)
    }

    fn last_sync_file(&self) -> PathBuf {
        self.config.tmp_dir().join(LAST_SYNC_FILE)
    }

    /// Repository URL registered for `name`, syncing the index first
    pub fn repository_url(&self, name: &str) -> Result<String> {
        if self.config.settings.disable_plugin_short_name_repository {
            return Err(RtmError::ShortNameRepositoryDisabled {
                name: name.to_string(),
            });
        }

        self.sync()?;

        self.lookup(name)?.ok_or_else(|| RtmError::PluginNotInIndex {
            name: name.to_string(),
        })
    }

    /// Read an entry from the local checkout without syncing
    pub fn lookup(&self, name: &str) -> Result<Option<String>> {
        let path = self.dir().join("plugins").join(name);
        if !path.is_file() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        Ok(parse_repository(&content))
    }

    /// Clone the index if missing, refresh it if stale.
    ///
    /// A failed refresh keeps the existing checkout usable.
    pub fn sync(&self) -> Result<()> {
        let dir = self.dir();
        let url = &self.config.settings.plugin_repository_url;

        if !dir.exists() {
            tracing::info!(url = %url, "cloning plugin index");
            clone_into_place(self.config, self.git, url, &dir)?;
            return self.record_sync();
        }

        if !self.is_stale() {
            return Ok(());
        }

        match self.refresh() {
            Ok(()) => self.record_sync(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh plugin index, using cached copy");
                Ok(())
            }
        }
    }

    fn refresh(&self) -> Result<()> {
        let dir = self.dir();
        self.git.fetch(&dir)?;
        let branch = self.git.default_branch(&dir)?;
        self.git.checkout(&dir, &branch)
    }

    fn is_stale(&self) -> bool {
        let minutes = self.config.settings.plugin_repository_last_check_duration;
        if minutes == 0 {
            return true;
        }

        let last_sync = fs::read_to_string(self.last_sync_file())
            .ok()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok());

        match last_sync {
            Some(at) => {
                let age = Utc::now().signed_duration_since(at.with_timezone(&Utc));
                age.num_minutes() >= i64::try_from(minutes).unwrap_or(i64::MAX)
            }
            None => true,
        }
    }

    fn record_sync(&self) -> Result<()> {
        fs::create_dir_all(self.config.tmp_dir())?;
        fs::write(self.last_sync_file(), Utc::now().to_rfc3339())?;
        Ok(())
    }
}

/// Value of the first `repository = <url>` line
fn parse_repository(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        let value = value.trim();
        (key.trim() == "repository" && !value.is_empty()).then(|| value.to_string())
    })
}
