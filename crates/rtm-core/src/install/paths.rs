//! Install path layout
//!
//! The single place that knows where versions live. Pure: no filesystem
//! access. Path builders never fail; callers that touch the filesystem
//! check the version with [`validate_version`] first.

use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, RtmError};
use crate::plugin::Plugin;

/// A version must be exactly one normal path segment, so it can never
/// address anything outside `installs/<plugin>`.
pub fn validate_version(version: &str) -> Result<()> {
    let mut components = Path::new(version).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None) if segment == version => Ok(()),
        _ => Err(RtmError::InvalidVersion {
            version: version.to_string(),
        }),
    }
}

/// `<data_dir>/installs/<plugin>`
pub fn plugin_installs_dir(config: &Config, plugin: &Plugin) -> PathBuf {
    config.installs_dir().join(plugin.name())
}

/// `<data_dir>/installs/<plugin>/<version>`
pub fn install_path(config: &Config, plugin: &Plugin, version: &str) -> PathBuf {
    plugin_installs_dir(config, plugin).join(version)
}

/// `<data_dir>/downloads/<plugin>`
pub fn plugin_downloads_dir(config: &Config, plugin: &Plugin) -> PathBuf {
    config.downloads_dir().join(plugin.name())
}

/// `<data_dir>/downloads/<plugin>/<version>`
pub fn download_path(config: &Config, plugin: &Plugin, version: &str) -> PathBuf {
    plugin_downloads_dir(config, plugin).join(version)
}
