//! Install staging
//!
//! The external installer populates a fresh directory under
//! `<data_dir>/tmp`; `commit` renames it to the install path in one step,
//! so a half-written tree is never visible as an installed version.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Config;
use crate::error::{Result, RtmError};
use crate::install::paths::{install_path, validate_version};
use crate::plugin::Plugin;

/// A not-yet-visible install directory.
///
/// Dropping it without calling [`InstallStaging::commit`] discards the
/// staged files.
#[derive(Debug)]
pub struct InstallStaging {
    dir: TempDir,
    target: PathBuf,
    plugin: String,
    version: String,
}

impl InstallStaging {
    pub fn begin(config: &Config, plugin: &Plugin, version: &str) -> Result<Self> {
        validate_version(version)?;

        let tmp = config.tmp_dir();
        fs::create_dir_all(&tmp)?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("install-{}-", plugin.name()))
            .tempdir_in(&tmp)?;

        tracing::debug!(
            plugin = plugin.name(),
            version,
            staging = %dir.path().display(),
            "staging install"
        );

        Ok(Self {
            dir,
            target: install_path(config, plugin, version),
            plugin: plugin.name().to_string(),
            version: version.to_string(),
        })
    }

    /// Where the installer should write
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Final install path after commit
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the staged tree to its install path.
    ///
    /// Fails with [`RtmError::VersionAlreadyInstalled`] if something is
    /// already there; the staged files are then discarded.
    pub fn commit(self) -> Result<PathBuf> {
        if self.target.exists() {
            return Err(RtmError::VersionAlreadyInstalled {
                plugin: self.plugin,
                version: self.version,
            });
        }

        if let Some(parent) = self.target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(self.dir.path(), &self.target)?;

        tracing::info!(plugin = %self.plugin, version = %self.version, "installed version");
        // The TempDir guard now points at a path that no longer exists;
        // its cleanup on drop is a no-op.
        Ok(self.target)
    }
}
