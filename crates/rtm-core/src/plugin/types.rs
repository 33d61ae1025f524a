//! Plugin handle and listing types

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, RtmError};
use crate::git::GitRepository;

/// A plugin checkout at `<data_dir>/plugins/<name>`.
///
/// This is a lightweight handle: nothing read from disk is cached, so every
/// attribute lookup reflects the current state of the checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    name: String,
    dir: PathBuf,
}

impl Plugin {
    /// Handle for `name`; does not check the name or touch the filesystem
    pub fn new(config: &Config, name: impl Into<String>) -> Self {
        let name = name.into();
        let dir = config.plugins_dir().join(&name);
        Self { name, dir }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the plugin directory is present
    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Origin remote URL, or an empty string when it can't be determined
    pub fn url<G: GitRepository + ?Sized>(&self, git: &G) -> String {
        match git.remote_url(&self.dir) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(plugin = %self.name, error = %e, "no remote url");
                String::new()
            }
        }
    }

    /// Commit currently checked out
    pub fn git_ref<G: GitRepository + ?Sized>(&self, git: &G) -> Result<String> {
        git.head(&self.dir)
    }
}

/// One row of `PluginRegistry::list`
///
/// `url` and `git_ref` are `None` when the caller didn't ask for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
}

/// Result of updating one plugin during a bulk update
#[derive(Debug)]
pub struct UpdateOutcome {
    pub name: String,
    /// Resolved revision on success
    pub result: Result<String>,
}

/// Plugin names become directory names: ASCII alphanumerics, `-` and `_`.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(RtmError::InvalidPluginName {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGitRepository;

    #[test]
    fn dir_is_under_plugins() {
        let config = Config::with_data_dir("/x");
        let plugin = Plugin::new(&config, "lua");
        assert_eq!(plugin.name(), "lua");
        assert_eq!(plugin.dir(), Path::new("/x/plugins/lua"));
    }

    #[test]
    fn validate_accepts_typical_names() {
        for name in ["lua", "nodejs", "1password-cli", "python_3"] {
            assert!(validate_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn validate_rejects_bad_names() {
        for name in ["", ".", "..", "a/b", "has space", "dot.name"] {
            let err = validate_name(name).unwrap_err();
            assert!(
                matches!(err, RtmError::InvalidPluginName { .. }),
                "{name}"
            );
        }
    }

    #[test]
    fn url_is_empty_when_lookup_fails() {
        let config = Config::with_data_dir("/x");
        let plugin = Plugin::new(&config, "lua");

        let mut git = MockGitRepository::new();
        git.expect_remote_url()
            .times(1)
            .returning(|_| Err(RtmError::git("remote", "not a git repository")));

        assert_eq!(plugin.url(&git), "");
    }

    #[test]
    fn attributes_are_read_every_time() {
        let config = Config::with_data_dir("/x");
        let plugin = Plugin::new(&config, "lua");

        let mut git = MockGitRepository::new();
        let mut seq = mockall::Sequence::new();
        git.expect_head()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("aaa".to_string()));
        git.expect_head()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("bbb".to_string()));

        assert_eq!(plugin.git_ref(&git).unwrap(), "aaa");
        assert_eq!(plugin.git_ref(&git).unwrap(), "bbb");
    }

    #[test]
    fn info_serializes_requested_fields_only() {
        let info = PluginInfo {
            name: "lua".to_string(),
            url: None,
            git_ref: Some("abc123".to_string()),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"name": "lua", "ref": "abc123"}));
    }
}
