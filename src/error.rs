//! Error types for bake.
//!
//! Only conditions that make a run impossible to continue are errors. A build
//! or git step that fails is recorded in the pipeline outcome instead.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for bake operations.
#[derive(Error, Debug)]
pub enum BakeError {
    // Version file errors
    #[error("Malformed version file {path}: {source}")]
    MalformedVersion {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot increment {field} of version {version}: already at maximum")]
    VersionOverflow {
        version: crate::version::Version,
        field: String,
    },

    #[error("Project is unversioned: {0}")]
    Unversioned(String),

    // Process errors
    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // Upload errors
    #[error("Upload failed: {0}")]
    UploadError(String),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using BakeError
pub type Result<T> = std::result::Result<T, BakeError>;

impl BakeError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an upload error
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::UploadError(msg.into())
    }

    pub fn command_failed(
        command: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }
}

// Generic I/O errors carry no useful classification of their own
impl From<std::io::Error> for BakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}

impl From<reqwest::Error> for BakeError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::UploadError(format!("server responded {status}"))
        } else {
            Self::UploadError(err.to_string())
        }
    }
}
