//! CLI argument parsing.
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::{config::DEFAULT_CONFIG_FILE, pipeline::Intent};

/// Minimal build and release tool.
#[derive(Parser, Debug)]
#[command(name = "bake", version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to an optional bake.toml configuration file.
    pub config: String,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Flags overriding values from bake.toml. Unset flags defer to the file.
#[derive(ClapArgs, Debug, Default, Clone, PartialEq, Eq)]
pub struct GlobalOverrides {
    #[arg(short = 'f', long, global = true)]
    /// Name of the version file (default: VERSION).
    pub version_file: Option<String>,

    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    /// Enable uploads of built binaries.
    pub enable_uploads: Option<bool>,

    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    /// Enable git related tasks.
    pub enable_git_tasks: Option<bool>,

    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    /// Enable git commits for version changes.
    pub enable_git_commit: Option<bool>,

    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    /// Enable git tagging for version changes.
    pub enable_git_tag: Option<bool>,

    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    /// Enable git push to remotes.
    pub enable_git_push: Option<bool>,

    #[arg(long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    /// Treat commands that exit with a non-zero status as failed.
    pub strict: Option<bool>,
}

/// Extra arguments handed to the build toolchain untouched.
#[derive(ClapArgs, Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Release subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Build a new major version.
    Major(BuildArgs),

    /// Build a new minor version.
    Minor(BuildArgs),

    /// Build at the next build number.
    Next(BuildArgs),

    /// Rebuild at the current version.
    Rebuild(BuildArgs),

    /// Rebuild at the current version and upload again.
    Reupload(BuildArgs),

    /// Print the version of bake itself.
    Version,
}

impl Command {
    /// Pipeline intent and build arguments for this command, or `None` for
    /// commands that bypass the pipeline.
    pub fn intent(&self) -> Option<(Intent, &[String])> {
        match self {
            Command::Major(b) => Some((Intent::Major, &b.args)),
            Command::Minor(b) => Some((Intent::Minor, &b.args)),
            Command::Next(b) => Some((Intent::Next, &b.args)),
            Command::Rebuild(b) => Some((Intent::Rebuild, &b.args)),
            Command::Reupload(b) => Some((Intent::Reupload, &b.args)),
            Command::Version => None,
        }
    }
}
