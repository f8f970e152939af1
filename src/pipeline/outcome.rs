//! Per-step results of a pipeline run.
use log::*;
use std::{fmt, path::PathBuf};

use crate::version::Version;

/// One discrete step of the release pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Build,
    VersionSave,
    Commit,
    Tag,
    Push,
    Upload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Build => "build",
            Step::VersionSave => "save version",
            Step::Commit => "git commit",
            Step::Tag => "git tag",
            Step::Push => "git push",
            Step::Upload => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed(String),
    /// The run produced no new version, so there is nothing to record.
    SkippedNoVersion,
    /// Switched off by configuration or by the selected intent.
    SkippedDisabled,
    /// A guard condition was not met.
    SkippedPrecondition(String),
}

impl StepStatus {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::SkippedPrecondition(reason.into())
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::SkippedNoVersion
                | Self::SkippedDisabled
                | Self::SkippedPrecondition(_)
        )
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Succeeded => write!(f, "ok"),
            StepStatus::Failed(reason) => write!(f, "error - {reason}"),
            StepStatus::SkippedNoVersion => write!(f, "skipped - no new version"),
            StepStatus::SkippedDisabled => write!(f, "skipped - disabled"),
            StepStatus::SkippedPrecondition(reason) => {
                write!(f, "skipped - {reason}")
            }
        }
    }
}

/// Ordered record of every step the run reached. Steps after a fatal failure
/// are absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Version the run built, new or current.
    pub version: Option<Version>,
    pub artifact: Option<PathBuf>,
    pub steps: Vec<(Step, StepStatus)>,
}

impl RunOutcome {
    /// Records a step result and emits its status line.
    pub fn record(&mut self, step: Step, status: StepStatus) {
        if status.is_failure() {
            error!("{step} ... {status}");
        } else if status.is_skip() {
            warn!("{step} ... {status}");
        } else {
            info!("{step} ... {status}");
        }
        self.steps.push((step, status));
    }

    pub fn status(&self, step: Step) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, status)| status)
    }

    /// The step that stopped the run, if any. Upload failures never stop a
    /// run.
    pub fn aborted_at(&self) -> Option<Step> {
        self.steps
            .iter()
            .find(|(step, status)| *step != Step::Upload && status.is_failure())
            .map(|(step, _)| *step)
    }

    /// True when build, version and git stages all passed. A failed upload
    /// does not change this.
    pub fn succeeded(&self) -> bool {
        self.aborted_at().is_none()
    }

    /// Best-effort upload was attempted and failed.
    pub fn upload_failed(&self) -> bool {
        self.status(Step::Upload).is_some_and(StepStatus::is_failure)
    }
}
