//! Plugin and installed-version registry for rtm.
//!
//! All state lives in the data directory; see [`config::Config`].

pub mod config;
pub mod error;
pub mod git;
pub mod install;
pub mod plugin;

pub use config::{Config, Settings};
pub use error::{ErrorKind, Result, RtmError};
pub use git::{Git, GitRepository};
pub use install::{
    download_path, install_path, installed, is_installed, uninstall, validate_version,
    InstallStaging,
};
pub use plugin::{validate_name, Plugin, PluginIndex, PluginInfo, PluginRegistry, UpdateOutcome};
