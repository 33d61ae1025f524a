//! Installed versions
//!
//! ```text
//! <data_dir>/installs/<plugin>/<version>/    # one directory per installed version
//! <data_dir>/downloads/<plugin>/<version>/   # download scratch space
//! ```
//!
//! An installed version is nothing more than its directory. Installing is
//! done by an external installer writing into an [`InstallStaging`] area.

pub mod paths;
pub mod staging;
pub mod tracker;

pub use paths::{
    download_path, install_path, plugin_downloads_dir, plugin_installs_dir, validate_version,
};
pub use staging::InstallStaging;
pub use tracker::{installed, is_installed, uninstall};
