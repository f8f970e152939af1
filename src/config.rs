//! Configuration loading and parsing for `bake.toml` files.
//!
//! Every field is optional. Command line flags take precedence over values
//! found here, and values found here take precedence over the built-in
//! defaults.
use log::*;
use serde::Deserialize;
use std::{fs, io::ErrorKind, path::Path};

use crate::{
    Result, artifact::DEFAULT_DIST_DIR, process::DEFAULT_LOG_DIR,
    version::DEFAULT_VERSION_FILE,
};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "bake.toml";
/// Default toolchain used to build the binary.
pub const DEFAULT_BUILD_PROGRAM: &str = "go";
/// Default symbol receiving the version string at link time.
pub const DEFAULT_VERSION_SYMBOL: &str = "main.version";
/// Default environment variable holding the upload token.
pub const DEFAULT_UPLOAD_TOKEN_ENV: &str = "BAKE_UPLOAD_TOKEN";

/// How the binary gets built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Toolchain executable (default: "go")
    pub program: String,
    /// Symbol set to the version string through `-ldflags "-X ..."`. An empty
    /// symbol disables version embedding.
    pub version_symbol: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_BUILD_PROGRAM.into(),
            version_symbol: DEFAULT_VERSION_SYMBOL.into(),
        }
    }
}

/// Git tasks performed after a new version is saved. All disabled unless
/// switched on.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub enabled: bool,
    pub commit: bool,
    pub tag: bool,
    pub push: bool,
}

/// Remote file store receiving built artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub enabled: bool,
    /// Base URL objects are uploaded under. Uploads report "not configured"
    /// while this is unset.
    pub endpoint: Option<String>,
    /// Environment variable holding a bearer token for the endpoint.
    pub token_env: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            token_env: DEFAULT_UPLOAD_TOKEN_ENV.into(),
        }
    }
}

/// Root configuration structure for `bake.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version_file: String,
    pub dist_dir: String,
    pub log_dir: String,
    /// Name of the built binary (default: name of the working directory)
    pub binary_name: Option<String>,
    /// Treat a command that exits non-zero as failed
    pub strict: bool,
    pub build: BuildConfig,
    pub git: GitConfig,
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_file: DEFAULT_VERSION_FILE.into(),
            dist_dir: DEFAULT_DIST_DIR.into(),
            log_dir: DEFAULT_LOG_DIR.into(),
            binary_name: None,
            strict: false,
            build: BuildConfig::default(),
            git: GitConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                Ok(toml::from_str(&content)?)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("configuration not found: using default");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}
