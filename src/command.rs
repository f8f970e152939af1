//! Command execution: wires configuration, logs and collaborators together
//! and hands the selected intent to the pipeline.
use log::*;
use std::{env, path::Path};

use crate::{
    Result,
    artifact::Target,
    cli::Args,
    config::Config,
    pipeline::{Intent, ReleaseContext, config::PipelineConfig},
    process::{LogSinks, SystemRunner},
    upload::HttpUploader,
    version,
};

/// Version string reported by `bake version`. A build identifier baked in
/// at compile time through `BAKE_BUILD_VERSION` is appended when present.
pub fn version_string() -> String {
    let pkg = env!("CARGO_PKG_VERSION");
    match option_env!("BAKE_BUILD_VERSION") {
        Some(build) if !build.is_empty() => format!("bake {pkg} ({build})"),
        _ => format!("bake {pkg}"),
    }
}

/// Executes the parsed command. Returns whether it succeeded.
pub fn execute(args: &Args) -> Result<bool> {
    match args.command.intent() {
        Some((intent, build_args)) => {
            release(&env::current_dir()?, args, intent, build_args)
        }
        // only `version` bypasses the pipeline
        None => {
            println!("{}", version_string());
            Ok(true)
        }
    }
}

/// Runs the release pipeline for a project rooted at `workdir`. A version
/// file that exists but cannot be parsed stops the run before anything is
/// logged or built.
fn release(
    workdir: &Path,
    args: &Args,
    intent: Intent,
    build_args: &[String],
) -> Result<bool> {
    let toml_config = Config::load(&workdir.join(&args.config))?;

    let config = PipelineConfig::builder()
        .toml_config(toml_config.clone())
        .global_overrides(args.overrides.clone())
        .workdir(workdir)
        .target(Target::from_env())
        .build()?;

    let current = version::load(config.version_file())?;

    let logs = LogSinks::open(&config.log_dir)?;
    let runner = SystemRunner::new(logs, config.exit_status);
    let uploader = HttpUploader::from_config(&toml_config.upload);

    let mut ctx = ReleaseContext::new(&config, &runner, &uploader, current);
    let outcome = ctx.run(intent, build_args)?;

    if let Some(step) = outcome.aborted_at() {
        error!("stopped at {step}");
    } else if outcome.upload_failed() {
        warn!("release finished but the upload failed");
    } else if let (Some(version), Some(artifact)) =
        (outcome.version, outcome.artifact.as_ref())
    {
        info!("finished {version}: {}", artifact.display());
    }

    Ok(outcome.succeeded())
}
