//! Plugin Module
//!
//! Plugins are git checkouts under `<data_dir>/plugins/<name>`.
//!
//! - `types`: the `Plugin` handle and listing/update result types
//! - `registry`: add, list, remove and update checkouts
//! - `index`: short-name lookup of plugin repository URLs

pub mod index;
pub mod registry;
pub mod types;

// Re-exports
pub use index::PluginIndex;
pub use registry::PluginRegistry;
pub use types::{validate_name, Plugin, PluginInfo, UpdateOutcome};
