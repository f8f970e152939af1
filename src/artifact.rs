//! Build artifact naming.
//!
//! Artifacts are named `<dist-dir>/<binary>-<version>-<os>-<arch>`. The target
//! platform follows the toolchain's naming so the same variables that steer
//! cross compilation also steer the artifact name.
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{BakeError, Result, version::Version};

/// Default output directory for built binaries.
pub const DEFAULT_DIST_DIR: &str = ".dist";
/// Environment variable overriding the target operating system.
pub const TARGET_OS_ENV: &str = "GOOS";
/// Environment variable overriding the target architecture.
pub const TARGET_ARCH_ENV: &str = "GOARCH";

/// Operating system and architecture an artifact is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub os: String,
    pub arch: String,
}

impl Target {
    /// The host platform in toolchain naming.
    pub fn host() -> Self {
        Self {
            os: host_os().into(),
            arch: host_arch().into(),
        }
    }

    /// The host platform, with either half replaced by the target
    /// environment variables when they are set and non-empty.
    pub fn from_env() -> Self {
        let host = Self::host();
        Self {
            os: non_empty_var(TARGET_OS_ENV).unwrap_or(host.os),
            arch: non_empty_var(TARGET_ARCH_ENV).unwrap_or(host.arch),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn host_os() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Falls back to the base name of `dir` when no binary name is configured.
pub fn binary_name(configured: Option<&str>, dir: &Path) -> Result<String> {
    if let Some(name) = configured.filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }

    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            BakeError::invalid_config(format!(
                "unable to derive binary name from directory {}",
                dir.display()
            ))
        })
}

/// Deterministic artifact location for a build.
pub fn artifact_path(
    dist_dir: &Path,
    binary_name: &str,
    version: &Version,
    target: &Target,
) -> PathBuf {
    dist_dir.join(format!(
        "{binary_name}-{version}-{}-{}",
        target.os, target.arch
    ))
}
