//! Common test utilities for pipeline tests.

use std::{fs, path::PathBuf};
use tempfile::TempDir;

use crate::{
    BakeError,
    artifact::Target,
    config::BuildConfig,
    pipeline::config::{GitPolicy, PipelineConfig},
    process::{ExitStatusPolicy, MockProcessRunner},
    version::{self, Version},
};

pub const TEST_BINARY: &str = "tool";

/// Temporary project directory plus a config pointing into it.
pub struct Fixture {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            version_file: dir.path().join("VERSION"),
            dist_dir: dir.path().join(".dist"),
            log_dir: dir.path().join(".log"),
            binary_name: TEST_BINARY.into(),
            target: Target {
                os: "linux".into(),
                arch: "amd64".into(),
            },
            build: BuildConfig::default(),
            git: GitPolicy::default(),
            uploads_enabled: false,
            exit_status: ExitStatusPolicy::Lenient,
        };
        Self { dir, config }
    }

    pub fn with_git(mut self, commit: bool, tag: bool, push: bool) -> Self {
        self.config.git = GitPolicy {
            enabled: true,
            commit,
            tag,
            push,
        };
        self
    }

    pub fn with_uploads(mut self) -> Self {
        self.config.uploads_enabled = true;
        self
    }

    /// Writes `v` as the current version and returns it.
    pub fn versioned(&self, v: Version) -> Option<Version> {
        version::save(&self.config.version_file, &v).unwrap();
        Some(v)
    }

    pub fn saved_version(&self) -> Option<Version> {
        version::load(&self.config.version_file).unwrap()
    }

    pub fn raw_version_file(&self) -> Option<String> {
        fs::read_to_string(&self.config.version_file).ok()
    }

    pub fn artifact(&self, version: &str) -> PathBuf {
        self.config
            .dist_dir
            .join(format!("{TEST_BINARY}-{version}-linux-amd64"))
    }
}

pub fn v(major: u64, minor: u64, build: u64) -> Version {
    Version {
        major,
        minor,
        build,
    }
}

pub fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn git_error() -> BakeError {
    BakeError::command_failed("git", "exit status: 128")
}

/// Runner whose toolchain is found and whose build run returns `ok`.
pub fn runner_with_build(ok: bool) -> MockProcessRunner {
    let mut runner = MockProcessRunner::new();
    runner
        .expect_locate()
        .returning(|p| Some(PathBuf::from(format!("/usr/local/bin/{p}"))));
    runner
        .expect_run()
        .withf(|inv| inv.label == "build")
        .times(1)
        .returning(move |_| ok);
    runner
}

/// Expects the repository check to find a repository.
pub fn expect_repo(runner: &mut MockProcessRunner) {
    runner
        .expect_capture()
        .withf(|p, a| p == "git" && a == args(&["rev-parse", "--git-dir"]))
        .returning(|_, _| Ok(".git\n".into()));
}

/// Expects a clean working tree with an `origin` remote.
pub fn expect_pushable(runner: &mut MockProcessRunner) {
    runner
        .expect_capture()
        .withf(|_, a| a == args(&["status", "-s"]))
        .returning(|_, _| Ok(String::new()));
    runner
        .expect_capture()
        .withf(|_, a| a == args(&["remote"]))
        .returning(|_, _| Ok("origin\n".into()));
}
