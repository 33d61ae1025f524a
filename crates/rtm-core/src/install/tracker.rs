//! Installed-version queries
//!
//! A version counts as installed when its install directory exists. The
//! directory contents are never inspected.

use std::fs;

use crate::config::Config;
use crate::error::{Result, RtmError};
use crate::install::paths::{install_path, plugin_installs_dir, validate_version};
use crate::plugin::Plugin;

/// Installed versions of `plugin`, sorted lexicographically.
///
/// A plugin that has never had a version installed yields an empty list.
pub fn installed(config: &Config, plugin: &Plugin) -> Result<Vec<String>> {
    let dir = plugin_installs_dir(config, plugin);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut versions = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            versions.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    versions.sort();

    Ok(versions)
}

/// Whether the install directory for `version` exists.
///
/// Always false for a version that isn't a single path segment.
pub fn is_installed(config: &Config, plugin: &Plugin, version: &str) -> bool {
    validate_version(version).is_ok() && install_path(config, plugin, version).is_dir()
}

/// Delete the install directory for `version`
pub fn uninstall(config: &Config, plugin: &Plugin, version: &str) -> Result<()> {
    validate_version(version)?;

    if !is_installed(config, plugin, version) {
        return Err(RtmError::VersionNotInstalled {
            plugin: plugin.name().to_string(),
            version: version.to_string(),
        });
    }

    fs::remove_dir_all(install_path(config, plugin, version))?;
    tracing::info!(plugin = plugin.name(), version, "uninstalled version");
    Ok(())
}
