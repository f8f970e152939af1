//! Version control tasks run after a new version is saved.
//!
//! Only a fixed sequence is supported: add and commit the version file, tag
//! the commit, push. Every call goes through the system `git` binary.
use log::*;
use std::path::Path;

use crate::{
    pipeline::outcome::StepStatus,
    process::{Invocation, ProcessRunner},
    version::Version,
};

const GIT: &str = "git";

pub struct Git<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> Git<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Whether the working directory is inside a git repository.
    pub fn is_repo(&self) -> bool {
        self.runner
            .capture(GIT, &["rev-parse".into(), "--git-dir".into()])
            .is_ok()
    }

    /// Stages and commits the version file.
    pub fn commit_version(
        &self,
        version_file: &Path,
        version: &Version,
    ) -> StepStatus {
        let file = version_file.display().to_string();

        if !self
            .runner
            .run(&Invocation::new("git add", GIT).args(["add", file.as_str()]))
        {
            return StepStatus::failed("git add failed");
        }

        let commit = Invocation::new("commitversion", GIT).args([
            "commit".to_string(),
            file,
            "-m".to_string(),
            format!("Built new version {version}"),
        ]);

        if self.runner.run(&commit) {
            StepStatus::Succeeded
        } else {
            StepStatus::failed("git commit failed")
        }
    }

    pub fn tag_version(&self, version: &Version) -> StepStatus {
        let tag = Invocation::new("git tag", GIT)
            .args(["tag".to_string(), format!("v{version}")]);

        if self.runner.run(&tag) {
            StepStatus::Succeeded
        } else {
            StepStatus::failed("git tag failed")
        }
    }

    /// Pushes to the default remote.
    ///
    /// A dirty working tree, missing remotes or an undeterminable status
    /// produce a skip. Only a push that was attempted and failed counts as a
    /// failure.
    pub fn push(&self) -> StepStatus {
        let changes = match self.runner.capture(GIT, &["status".into(), "-s".into()])
        {
            Ok(changes) => changes,
            Err(e) => {
                debug!("unable to determine working tree status: {e}");
                return StepStatus::skipped("unknown status");
            }
        };

        if !changes.is_empty() {
            debug!("uncommitted changes:\n{changes}");
            return StepStatus::skipped("uncommitted changes");
        }

        match self.runner.capture(GIT, &["remote".into()]) {
            Ok(remotes) if !remotes.trim().is_empty() => {}
            _ => return StepStatus::skipped("no remotes"),
        }

        if self.runner.succeeds(&Invocation::new("git push", GIT).arg("push")) {
            StepStatus::Succeeded
        } else {
            StepStatus::failed("git push failed")
        }
    }
}
