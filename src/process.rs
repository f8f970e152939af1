//! External process execution with shared log capture.
//!
//! Every command started through [`SystemRunner::run`] writes its standard
//! output to one log file and its standard error to another. Both files are
//! opened once per invocation of the tool and appended to by every run, with
//! each entry framed by its label so consecutive runs are easy to tell apart.
use log::*;
#[cfg(test)]
use mockall::automock;
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use crate::{BakeError, Result};

/// Default directory holding the log files.
pub const DEFAULT_LOG_DIR: &str = ".log";
/// Log file receiving standard output of every run.
pub const OUT_LOG_FILE: &str = "bake.log";
/// Log file receiving standard error of every run.
pub const ERR_LOG_FILE: &str = "bake.err.log";

/// Decides whether a process that started counts as a success.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatusPolicy {
    /// A process that could be started counts as a success, whatever its
    /// exit status.
    #[default]
    Lenient,
    /// The process must also exit with a zero status.
    Strict,
}

impl ExitStatusPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// A single external command along with the label used to frame its logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(label: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: vec![],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args.iter() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Capability used by the pipeline to talk to the outside world.
#[cfg_attr(test, automock)]
pub trait ProcessRunner {
    /// Run a command with its output appended to the logs.
    ///
    /// Returns `false` when the process could not be started. Whether a
    /// non-zero exit also counts as failure depends on the runner's
    /// [`ExitStatusPolicy`].
    fn run(&self, invocation: &Invocation) -> bool;

    /// Like [`ProcessRunner::run`] but always requires a zero exit status.
    fn succeeds(&self, invocation: &Invocation) -> bool;

    /// Run a command and return its standard output. Fails when the command
    /// cannot be started or exits non-zero.
    fn capture(&self, program: &str, args: &[String]) -> Result<String>;

    /// Look up a program on `PATH`.
    fn locate(&self, program: &str) -> Option<PathBuf>;
}

/// The two append-only destinations shared by every run.
pub struct LogSinks {
    out: File,
    err: File,
}

impl LogSinks {
    /// Creates `dir` if needed and opens both log files for appending.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            BakeError::invalid_config(format!(
                "unable to create log directory {}: {e}",
                dir.display()
            ))
        })?;

        let out = open_append(&dir.join(OUT_LOG_FILE))?;
        let err = open_append(&dir.join(ERR_LOG_FILE))?;

        Ok(Self { out, err })
    }

    fn frame(&self, label: &str) -> Result<(File, File)> {
        let header = format!("---\n{label}\n---\n");
        (&self.out).write_all(header.as_bytes())?;
        (&self.err).write_all(header.as_bytes())?;
        Ok((self.out.try_clone()?, self.err.try_clone()?))
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            BakeError::invalid_config(format!(
                "unable to open log file {}: {e}",
                path.display()
            ))
        })
}

/// [`ProcessRunner`] backed by real subprocesses.
pub struct SystemRunner {
    logs: LogSinks,
    policy: ExitStatusPolicy,
}

impl SystemRunner {
    pub fn new(logs: LogSinks, policy: ExitStatusPolicy) -> Self {
        Self { logs, policy }
    }

    /// Starts the invocation and waits for it. `None` means the process
    /// never started.
    fn spawn_logged(&self, invocation: &Invocation) -> Option<ExitStatus> {
        debug!("running [{}]: {invocation}", invocation.label);

        let (out, err) = match self.logs.frame(&invocation.label) {
            Ok(handles) => handles,
            Err(e) => {
                error!("unable to write log frame: {e}");
                return None;
            }
        };

        let mut child = match Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(out))
            .stderr(Stdio::from(err))
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                debug!("failed to start {}: {e}", invocation.program);
                return None;
            }
        };

        match child.wait() {
            Ok(status) => {
                debug!("[{}] exited with {status}", invocation.label);
                Some(status)
            }
            Err(e) => {
                warn!("failed waiting on {}: {e}", invocation.program);
                // Started but the exit status is unknowable.
                Some(failed_status())
            }
        }
    }
}

#[cfg(unix)]
fn failed_status() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(1 << 8)
}

#[cfg(windows)]
fn failed_status() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(1)
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> bool {
        match self.spawn_logged(invocation) {
            None => false,
            Some(status) => match self.policy {
                ExitStatusPolicy::Lenient => true,
                ExitStatusPolicy::Strict => status.success(),
            },
        }
    }

    fn succeeds(&self, invocation: &Invocation) -> bool {
        self.spawn_logged(invocation)
            .is_some_and(|status| status.success())
    }

    fn capture(&self, program: &str, args: &[String]) -> Result<String> {
        let command = format!("{} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| BakeError::command_failed(&command, e.to_string()))?;

        if !output.status.success() {
            return Err(BakeError::command_failed(
                &command,
                output.status.to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
