use derive_builder::Builder;
use std::path::{Path, PathBuf};

use crate::{
    BakeError, Result,
    artifact::{self, Target},
    cli::GlobalOverrides,
    config::{BuildConfig, Config},
    process::ExitStatusPolicy,
    version::Version,
};

#[derive(Debug, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct PipelineConfigParams {
    pub toml_config: Config,
    pub global_overrides: GlobalOverrides,
    /// Directory the tool runs in. Relative paths resolve against it and it
    /// names the binary when none is configured.
    pub workdir: PathBuf,
    pub target: Target,
}

impl PipelineConfigParamsBuilder {
    pub fn build(&self) -> Result<PipelineConfig> {
        let params = self._build().map_err(|e| {
            BakeError::invalid_config(format!(
                "Failed to build pipeline config: {}",
                e
            ))
        })?;
        PipelineConfig::new(params)
    }
}

/// Which git sub-steps may run once the git stage is entered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GitPolicy {
    pub enabled: bool,
    pub commit: bool,
    pub tag: bool,
    pub push: bool,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub version_file: PathBuf,
    pub dist_dir: PathBuf,
    pub log_dir: PathBuf,
    pub binary_name: String,
    pub target: Target,
    pub build: BuildConfig,
    pub git: GitPolicy,
    pub uploads_enabled: bool,
    pub exit_status: ExitStatusPolicy,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigParamsBuilder {
        PipelineConfigParamsBuilder::default()
    }

    pub fn new(params: PipelineConfigParams) -> Result<Self> {
        let toml = params.toml_config;
        let overrides = params.global_overrides;

        if toml.build.program.is_empty() {
            return Err(BakeError::invalid_config(
                "build.program must not be empty",
            ));
        }

        let binary_name = artifact::binary_name(
            toml.binary_name.as_deref(),
            &params.workdir,
        )?;

        let git = GitPolicy {
            enabled: overrides.enable_git_tasks.unwrap_or(toml.git.enabled),
            commit: overrides.enable_git_commit.unwrap_or(toml.git.commit),
            tag: overrides.enable_git_tag.unwrap_or(toml.git.tag),
            push: overrides.enable_git_push.unwrap_or(toml.git.push),
        };

        let strict = overrides.strict.unwrap_or(toml.strict);

        let workdir = &params.workdir;

        Ok(Self {
            version_file: workdir
                .join(overrides.version_file.unwrap_or(toml.version_file)),
            dist_dir: workdir.join(toml.dist_dir),
            log_dir: workdir.join(toml.log_dir),
            binary_name,
            target: params.target,
            build: toml.build,
            git,
            uploads_enabled: overrides
                .enable_uploads
                .unwrap_or(toml.upload.enabled),
            exit_status: ExitStatusPolicy::from_strict(strict),
        })
    }

    pub fn artifact_path(&self, version: &Version) -> PathBuf {
        artifact::artifact_path(
            &self.dist_dir,
            &self.binary_name,
            version,
            &self.target,
        )
    }

    pub fn version_file(&self) -> &Path {
        &self.version_file
    }
}
