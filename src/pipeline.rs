//! The build and release pipeline.
//!
//! A run moves through fixed stages: bump, build, save version, git tasks and
//! upload. Any failure before the upload stage stops the run. Nothing that
//! already happened is rolled back, so a commit stays committed even when
//! tagging fails afterwards. Upload is best effort.
use log::*;
use std::{fs, path::Path};

use crate::{
    BakeError, Result,
    git::Git,
    process::{Invocation, ProcessRunner},
    upload::{UploadRequest, Uploader},
    version::{self, Version},
};

pub mod config;
pub mod outcome;

use config::PipelineConfig;
use outcome::{RunOutcome, Step, StepStatus};

/// Which part of the version an intent increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    Build,
}

impl BumpKind {
    fn apply(&self, version: &mut Version) -> Result<()> {
        match self {
            BumpKind::Major => version.inc_major(),
            BumpKind::Minor => version.inc_minor(),
            BumpKind::Build => version.inc_build(),
        }
    }
}

impl std::fmt::Display for BumpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BumpKind::Major => write!(f, "major"),
            BumpKind::Minor => write!(f, "minor"),
            BumpKind::Build => write!(f, "build"),
        }
    }
}

/// A user-selected release action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Major,
    Minor,
    Next,
    Rebuild,
    Reupload,
}

impl Intent {
    pub fn bump(&self) -> Option<BumpKind> {
        match self {
            Intent::Major => Some(BumpKind::Major),
            Intent::Minor => Some(BumpKind::Minor),
            Intent::Next => Some(BumpKind::Build),
            Intent::Rebuild | Intent::Reupload => None,
        }
    }

    pub fn requests_upload(&self) -> bool {
        !matches!(self, Intent::Rebuild)
    }
}

/// Everything one invocation of the pipeline works with. Built once and
/// passed through every stage.
pub struct ReleaseContext<'a> {
    pub config: &'a PipelineConfig,
    pub runner: &'a dyn ProcessRunner,
    pub uploader: &'a dyn Uploader,
    /// Current version, `None` while the project is unversioned. Holds the
    /// new version once a bump has happened.
    pub version: Option<Version>,
}

impl<'a> ReleaseContext<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        runner: &'a dyn ProcessRunner,
        uploader: &'a dyn Uploader,
        version: Option<Version>,
    ) -> Self {
        Self {
            config,
            runner,
            uploader,
            version,
        }
    }

    /// Runs the pipeline for `intent`.
    ///
    /// Step failures are reported through the returned [`RunOutcome`]. An
    /// error means the run could not begin at all.
    pub fn run(
        &mut self,
        intent: Intent,
        build_args: &[String],
    ) -> Result<RunOutcome> {
        let (version, is_new) = self.resolve_version(intent)?;
        let artifact = self.config.artifact_path(&version);

        let mut outcome = RunOutcome {
            version: Some(version),
            artifact: Some(artifact.clone()),
            ..RunOutcome::default()
        };

        info!("building {} ...", artifact.display());
        let status = self.build(&version, &artifact, build_args);
        if !proceed(&mut outcome, Step::Build, status) {
            return Ok(outcome);
        }

        let status = if is_new {
            self.save_version(&version)
        } else {
            StepStatus::SkippedNoVersion
        };
        if !proceed(&mut outcome, Step::VersionSave, status) {
            return Ok(outcome);
        }

        if !self.git_stage(is_new, &version, &mut outcome) {
            return Ok(outcome);
        }

        let status = self.upload(intent, &artifact);
        outcome.record(Step::Upload, status);

        info!("done");

        Ok(outcome)
    }

    /// Applies the intent's bump, returning the version to build and whether
    /// it is new.
    fn resolve_version(&mut self, intent: Intent) -> Result<(Version, bool)> {
        match (intent.bump(), self.version) {
            (Some(kind), None) => {
                let version = Version::new();
                info!("new {kind} version: {version}");
                self.version = Some(version);
                Ok((version, true))
            }
            (Some(kind), Some(mut version)) => {
                kind.apply(&mut version)?;
                info!("new {kind} version: {version}");
                self.version = Some(version);
                Ok((version, true))
            }
            (None, Some(version)) => Ok((version, false)),
            (None, None) => Err(BakeError::Unversioned(format!(
                "{} does not exist, build a new version first",
                self.config.version_file().display()
            ))),
        }
    }

    fn build(
        &self,
        version: &Version,
        artifact: &Path,
        build_args: &[String],
    ) -> StepStatus {
        let program = &self.config.build.program;

        match self.runner.locate(program) {
            Some(path) => debug!("using toolchain at {}", path.display()),
            None => {
                return StepStatus::failed(format!("{program} not found"));
            }
        }

        if let Some(dir) = artifact.parent().filter(|d| !d.as_os_str().is_empty())
            && let Err(e) = fs::create_dir_all(dir)
        {
            return StepStatus::failed(format!(
                "unable to create {}: {e}",
                dir.display()
            ));
        }

        let mut invocation = Invocation::new("build", program).args([
            "build".to_string(),
            "-o".to_string(),
            artifact.display().to_string(),
        ]);

        let symbol = &self.config.build.version_symbol;
        if !symbol.is_empty() {
            invocation = invocation
                .arg("-ldflags")
                .arg(format!("-X {symbol}={version}"));
        }

        invocation = invocation.args(build_args.iter().cloned());

        if self.runner.run(&invocation) {
            StepStatus::Succeeded
        } else {
            StepStatus::failed(format!("unable to run {program}"))
        }
    }

    fn save_version(&self, version: &Version) -> StepStatus {
        match version::save(self.config.version_file(), version) {
            Ok(()) => StepStatus::Succeeded,
            Err(e) => StepStatus::failed(e.to_string()),
        }
    }

    /// Returns false when a git step failed and the run must stop.
    fn git_stage(
        &self,
        is_new: bool,
        version: &Version,
        outcome: &mut RunOutcome,
    ) -> bool {
        let policy = self.config.git;
        let git = Git::new(self.runner);

        let skip_all = if !policy.enabled {
            Some(StepStatus::SkippedDisabled)
        } else if !git.is_repo() {
            Some(StepStatus::skipped("not a git repository"))
        } else if !is_new {
            Some(StepStatus::SkippedNoVersion)
        } else {
            None
        };

        if let Some(status) = skip_all {
            for step in [Step::Commit, Step::Tag, Step::Push] {
                outcome.record(step, status.clone());
            }
            return true;
        }

        let status = if policy.commit {
            info!("git commit new version ...");
            git.commit_version(self.config.version_file(), version)
        } else {
            StepStatus::SkippedDisabled
        };
        if !proceed(outcome, Step::Commit, status) {
            return false;
        }

        let status = if policy.tag {
            info!("adding git tag ...");
            git.tag_version(version)
        } else {
            StepStatus::SkippedDisabled
        };
        if !proceed(outcome, Step::Tag, status) {
            return false;
        }

        let status = if policy.push {
            info!("git push to remote ...");
            git.push()
        } else {
            StepStatus::SkippedDisabled
        };
        proceed(outcome, Step::Push, status)
    }

    fn upload(&self, intent: Intent, artifact: &Path) -> StepStatus {
        if !intent.requests_upload() || !self.config.uploads_enabled {
            return StepStatus::SkippedDisabled;
        }

        if !self.uploader.is_configured() {
            return StepStatus::skipped("not configured");
        }

        info!("uploading new binary ...");

        let result = UploadRequest::for_artifact(artifact.to_path_buf())
            .and_then(|req| self.uploader.upload(&req));

        match result {
            Ok(()) => StepStatus::Succeeded,
            Err(e) => StepStatus::failed(e.to_string()),
        }
    }
}

/// Records the step and reports whether the run may continue.
fn proceed(outcome: &mut RunOutcome, step: Step, status: StepStatus) -> bool {
    let failed = status.is_failure();
    outcome.record(step, status);
    !failed
}
