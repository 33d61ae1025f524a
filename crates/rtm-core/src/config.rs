use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RtmError};

const CONFIG_FILE: &str = "config.toml";
const DATA_DIR_ENV: &str = "RTM_DATA_DIR";
const CONFIG_FILE_ENV: &str = "RTM_CONFIG_FILE";
const DEFAULT_DATA_DIR: &str = ".rtm";

pub const DEFAULT_PLUGIN_REPOSITORY_URL: &str = "https://github.com/asdf-vm/asdf-plugins.git";
const DEFAULT_LAST_CHECK_DURATION: u64 = 60;

/// Process-wide configuration.
///
/// Loaded once per invocation and treated as read-only afterwards. Tests
/// point `data_dir` at a temporary directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root for every piece of managed state
    pub data_dir: PathBuf,
    /// File the settings were (or would be) read from
    pub config_file: PathBuf,
    pub settings: Settings,
}

/// Settings read from the TOML config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_plugin_repository_url")]
    pub plugin_repository_url: String,

    #[serde(default)]
    pub disable_plugin_short_name_repository: bool,

    /// Minutes
    #[serde(default = "default_last_check_duration")]
    pub plugin_repository_last_check_duration: u64,
}

fn default_plugin_repository_url() -> String {
    DEFAULT_PLUGIN_REPOSITORY_URL.to_string()
}

fn default_last_check_duration() -> u64 {
    DEFAULT_LAST_CHECK_DURATION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plugin_repository_url: default_plugin_repository_url(),
            disable_plugin_short_name_repository: false,
            plugin_repository_last_check_duration: DEFAULT_LAST_CHECK_DURATION,
        }
    }
}

impl Config {
    /// Load config for this process.
    ///
    /// Data dir priority: `data_dir` argument > `RTM_DATA_DIR` > `~/.rtm`.
    /// Config file priority: `RTM_CONFIG_FILE` > `<data_dir>/config.toml`.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => match std::env::var_os(DATA_DIR_ENV) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => dirs::home_dir()
                    .ok_or(RtmError::HomeNotFound)?
                    .join(DEFAULT_DATA_DIR),
            },
        };

        let config_file = match std::env::var_os(CONFIG_FILE_ENV) {
            Some(file) if !file.is_empty() => PathBuf::from(file),
            _ => data_dir.join(CONFIG_FILE),
        };

        Self::load_from(data_dir, config_file)
    }

    /// Load settings from an explicit file; a missing file yields defaults.
    pub fn load_from(data_dir: PathBuf, config_file: PathBuf) -> Result<Self> {
        let settings = if config_file.exists() {
            let content = fs::read_to_string(&config_file)?;
            toml::from_str(&content).map_err(|e| RtmError::ConfigParse {
                path: config_file.clone(),
                message: e.to_string(),
            })?
        } else {
            Settings::default()
        };

        tracing::debug!(
            data_dir = %data_dir.display(),
            config_file = %config_file.display(),
            "loaded config"
        );

        Ok(Self {
            data_dir,
            config_file,
            settings,
        })
    }

    /// Default settings rooted at `data_dir` (for testing)
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            config_file: data_dir.join(CONFIG_FILE),
            data_dir,
            settings: Settings::default(),
        }
    }

    /// `<data_dir>/plugins`
    pub fn plugins_dir(&self) -> PathBuf {
        self.data_dir.join("plugins")
    }

    /// `<data_dir>/installs`
    pub fn installs_dir(&self) -> PathBuf {
        self.data_dir.join("installs")
    }

    /// `<data_dir>/downloads`
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads")
    }

    /// Scratch space for staging directories, kept on the same filesystem
    /// as the data dir so staged trees can be renamed into place.
    pub fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join("tmp")
    }

    /// All settings as key/value pairs
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            (
                "plugin_repository_url".to_string(),
                self.settings.plugin_repository_url.clone(),
            ),
            (
                "disable_plugin_short_name_repository".to_string(),
                self.settings.disable_plugin_short_name_repository.to_string(),
            ),
            (
                "plugin_repository_last_check_duration".to_string(),
                self.settings.plugin_repository_last_check_duration.to_string(),
            ),
        ]
    }
}
