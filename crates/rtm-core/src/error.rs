use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RtmError {
    #[error("Plugin named {name} already added")]
    PluginAlreadyExists { name: String },

    #[error("No such plugin: {name}")]
    PluginNotFound { name: String },

    #[error("Invalid plugin name: '{name}' - must contain only alphanumeric, hyphen, underscore")]
    InvalidPluginName { name: String },

    #[error("Plugin {name} not found in plugin repository")]
    PluginNotInIndex { name: String },

    #[error("Short-name plugin repository is disabled, a git URL is required to add {name}")]
    ShortNameRepositoryDisabled { name: String },

    #[error("Invalid version: '{version}' - must be a single path segment")]
    InvalidVersion { version: String },

    #[error("Version {version} of {plugin} is already installed")]
    VersionAlreadyInstalled { plugin: String, version: String },

    #[error("Version {version} of {plugin} is not installed")]
    VersionNotInstalled { plugin: String, version: String },

    #[error("Config parse error in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Home directory not found")]
    HomeNotFound,

    #[error("git {command} failed: {message}")]
    Git { command: String, message: String },
}

pub type Result<T> = std::result::Result<T, RtmError>;

/// Coarse classification callers use to decide how to react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The target already exists; callers may treat this as success.
    AlreadyExists,
    NotFound,
    InvalidArgument,
    /// A git subprocess or filesystem operation failed.
    ExternalOperationFailed,
}

impl RtmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PluginAlreadyExists { .. } | Self::VersionAlreadyInstalled { .. } => {
                ErrorKind::AlreadyExists
            }
            Self::PluginNotFound { .. }
            | Self::VersionNotInstalled { .. }
            | Self::PluginNotInIndex { .. } => ErrorKind::NotFound,
            Self::InvalidPluginName { .. }
            | Self::InvalidVersion { .. }
            | Self::ShortNameRepositoryDisabled { .. } => ErrorKind::InvalidArgument,
            Self::ConfigParse { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::HomeNotFound
            | Self::Git { .. } => ErrorKind::ExternalOperationFailed,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::NotFound => 2,
            ErrorKind::InvalidArgument => 3,
            ErrorKind::AlreadyExists => 4,
            ErrorKind::ExternalOperationFailed => 1,
        }
    }

    pub(crate) fn git(command: &str, message: impl Into<String>) -> Self {
        Self::Git {
            command: command.to_string(),
            message: message.into(),
        }
    }
}
