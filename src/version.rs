//! Version file handling.
//!
//! The version file holds a JSON object with `major`, `minor` and `build`
//! fields. A missing file means the project has never been versioned, which
//! is a valid starting state and not an error.
use log::*;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, io::ErrorKind, path::Path};

use crate::{BakeError, Result};

/// Default version filename.
pub const DEFAULT_VERSION_FILE: &str = "VERSION";

/// Three-field project version. Field order gives the lexicographic
/// (major, minor, build) ordering used when comparing versions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub build: u64,
}

impl Version {
    /// Initial version for a project that has never been versioned.
    pub fn new() -> Self {
        Self {
            major: 0,
            minor: 1,
            build: 0,
        }
    }

    /// Each increment fails instead of wrapping when a field is already at
    /// its maximum, leaving the version untouched.
    pub fn inc_major(&mut self) -> Result<()> {
        self.major = self.checked_inc(self.major, "major")?;
        self.minor = 0;
        self.build = 1;
        debug!("new major version: {self}");
        Ok(())
    }

    pub fn inc_minor(&mut self) -> Result<()> {
        self.minor = self.checked_inc(self.minor, "minor")?;
        self.build = 1;
        debug!("new minor version: {self}");
        Ok(())
    }

    pub fn inc_build(&mut self) -> Result<()> {
        self.build = self.checked_inc(self.build, "build")?;
        debug!("new build version: {self}");
        Ok(())
    }

    fn checked_inc(&self, value: u64, field: &str) -> Result<u64> {
        value.checked_add(1).ok_or_else(|| BakeError::VersionOverflow {
            version: *self,
            field: field.to_string(),
        })
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)
    }
}

/// Reads the version file.
///
/// # Returns
///
/// * `Ok(Some(Version))` - the file exists and parsed cleanly
/// * `Ok(None)` - the file does not exist (project is unversioned)
/// * `Err(_)` - the file could not be read or is not a valid version
pub fn load(path: &Path) -> Result<Option<Version>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("current version: unversioned");
            return Ok(None);
        }
        Err(err) => {
            warn!("current version: unknown");
            return Err(err.into());
        }
    };

    let version: Version =
        serde_json::from_str(&content).map_err(|source| {
            warn!("current version: unknown");
            BakeError::MalformedVersion {
                path: path.to_path_buf(),
                source,
            }
        })?;

    info!("current version: {version}");

    Ok(Some(version))
}

/// Overwrites the version file with `version`.
pub fn save(path: &Path, version: &Version) -> Result<()> {
    let data = serde_json::to_string(version)?;
    fs::write(path, data)?;
    Ok(())
}
