//! Tests for version bumps, saves and the build step.

use super::common::*;
use crate::{
    BakeError,
    pipeline::{
        Intent, ReleaseContext,
        outcome::{Step, StepStatus},
    },
    process::MockProcessRunner,
    upload::MockUploader,
};

#[test_log::test]
fn unversioned_major_saves_initial_version() {
    let fixture = Fixture::new();
    let runner = runner_with_build(true);
    let uploader = MockUploader::new();

    let mut ctx = ReleaseContext::new(&fixture.config, &runner, &uploader, None);
    let outcome = ctx.run(Intent::Major, &[]).unwrap();

    assert!(outcome.succeeded());
    assert_eq!(outcome.version, Some(v(0, 1, 0)));
    assert_eq!(fixture.saved_version(), Some(v(0, 1, 0)));
    assert_eq!(ctx.version, Some(v(0, 1, 0)));
    assert_eq!(outcome.status(Step::VersionSave), Some(&StepStatus::Succeeded));
}

#[test]
fn unversioned_minor_and_next_also_start_at_initial_version() {
    for intent in [Intent::Minor, Intent::Next] {
        let fixture = Fixture::new();
        let runner = runner_with_build(true);
        let uploader = MockUploader::new();

        let mut ctx =
            ReleaseContext::new(&fixture.config, &runner, &uploader, None);
        ctx.run(intent, &[]).unwrap();

        assert_eq!(fixture.saved_version(), Some(v(0, 1, 0)));
    }
}

#[test]
fn major_bump_resets_minor_and_build() {
    let fixture = Fixture::new();
    let current = fixture.versioned(v(1, 2, 5));
    let runner = runner_with_build(true);
    let uploader = MockUploader::new();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    ctx.run(Intent::Major, &[]).unwrap();

    assert_eq!(fixture.saved_version(), Some(v(2, 0, 1)));
}

#[test]
fn minor_bump_saves_next_minor() {
    let fixture = Fixture::new();
    let current = fixture.versioned(v(1, 2, 5));
    let runner = runner_with_build(true);
    let uploader = MockUploader::new();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    ctx.run(Intent::Minor, &[]).unwrap();

    assert_eq!(fixture.saved_version(), Some(v(1, 3, 1)));
}

#[test]
fn next_bump_saves_next_build() {
    let fixture = Fixture::new();
    let current = fixture.versioned(v(1, 2, 5));
    let runner = runner_with_build(true);
    let uploader = MockUploader::new();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    let outcome = ctx.run(Intent::Next, &[]).unwrap();

    assert_eq!(fixture.saved_version(), Some(v(1, 2, 6)));
    assert_eq!(outcome.artifact, Some(fixture.artifact("1.2.6")));
}

#[test]
fn overflowing_bump_stops_before_build() {
    let fixture = Fixture::new().with_git(true, true, true);
    let current = fixture.versioned(v(1, 2, u64::MAX));
    let before = fixture.raw_version_file();

    let mut runner = MockProcessRunner::new();
    runner.expect_locate().never();
    runner.expect_run().never();
    runner.expect_capture().never();
    let uploader = MockUploader::new();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    let result = ctx.run(Intent::Next, &[]);

    assert!(matches!(result, Err(BakeError::VersionOverflow { .. })));
    assert_eq!(ctx.version, current);
    assert_eq!(fixture.raw_version_file(), before);
}

#[test]
fn build_embeds_new_version_and_passes_extra_args() {
    let fixture = Fixture::new();
    let current = fixture.versioned(v(1, 2, 5));
    let artifact = fixture.artifact("1.2.6").display().to_string();

    let mut runner = MockProcessRunner::new();
    runner
        .expect_locate()
        .returning(|_| Some("/usr/local/go/bin/go".into()));
    runner
        .expect_run()
        .withf(move |inv| {
            inv.label == "build"
                && inv.program == "go"
                && inv.args
                    == args(&[
                        "build",
                        "-o",
                        artifact.as_str(),
                        "-ldflags",
                        "-X main.version=1.2.6",
                        "-race",
                    ])
        })
        .times(1)
        .returning(|_| true);
    let uploader = MockUploader::new();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    let outcome = ctx.run(Intent::Next, &args(&["-race"])).unwrap();

    assert!(outcome.succeeded());
    assert!(fixture.config.dist_dir.is_dir());
}

#[test]
fn empty_version_symbol_skips_ldflags() {
    let mut fixture = Fixture::new();
    fixture.config.build.version_symbol = String::new();
    let artifact = fixture.artifact("0.1.0").display().to_string();

    let mut runner = MockProcessRunner::new();
    runner.expect_locate().returning(|_| Some("go".into()));
    runner
        .expect_run()
        .withf(move |inv| inv.args == args(&["build", "-o", artifact.as_str()]))
        .times(1)
        .returning(|_| true);
    let uploader = MockUploader::new();

    let mut ctx = ReleaseContext::new(&fixture.config, &runner, &uploader, None);
    assert!(ctx.run(Intent::Next, &[]).unwrap().succeeded());
}

#[test]
fn failed_build_aborts_before_saving() {
    let fixture = Fixture::new().with_git(true, true, true).with_uploads();
    let current = fixture.versioned(v(1, 2, 5));
    let before = fixture.raw_version_file();
    let mut runner = runner_with_build(false);
    runner.expect_capture().never();
    let mut uploader = MockUploader::new();
    uploader.expect_upload().never();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    let outcome = ctx.run(Intent::Next, &[]).unwrap();

    assert!(!outcome.succeeded());
    assert_eq!(outcome.aborted_at(), Some(Step::Build));
    assert_eq!(outcome.steps.len(), 1);
    assert_eq!(fixture.raw_version_file(), before);
}

#[test]
fn missing_toolchain_is_fatal() {
    let fixture = Fixture::new();
    let mut runner = MockProcessRunner::new();
    runner.expect_locate().times(1).returning(|_| None);
    runner.expect_run().never();
    let uploader = MockUploader::new();

    let mut ctx = ReleaseContext::new(&fixture.config, &runner, &uploader, None);
    let outcome = ctx.run(Intent::Major, &[]).unwrap();

    assert_eq!(
        outcome.status(Step::Build),
        Some(&StepStatus::failed("go not found"))
    );
    assert_eq!(fixture.raw_version_file(), None);
}

#[test]
fn rebuild_of_unversioned_project_is_an_error() {
    for intent in [Intent::Rebuild, Intent::Reupload] {
        let fixture = Fixture::new();
        let mut runner = MockProcessRunner::new();
        runner.expect_locate().never();
        runner.expect_run().never();
        let uploader = MockUploader::new();

        let mut ctx =
            ReleaseContext::new(&fixture.config, &runner, &uploader, None);
        let result = ctx.run(intent, &[]);

        assert!(matches!(result, Err(BakeError::Unversioned(_))));
    }
}

#[test]
fn rebuild_keeps_version_and_skips_save() {
    let fixture = Fixture::new();
    let current = fixture.versioned(v(1, 2, 5));
    let before = fixture.raw_version_file();
    let runner = runner_with_build(true);
    let uploader = MockUploader::new();

    let mut ctx =
        ReleaseContext::new(&fixture.config, &runner, &uploader, current);
    let outcome = ctx.run(Intent::Rebuild, &[]).unwrap();

    assert!(outcome.succeeded());
    assert_eq!(
        outcome.status(Step::VersionSave),
        Some(&StepStatus::SkippedNoVersion)
    );
    assert_eq!(outcome.artifact, Some(fixture.artifact("1.2.5")));
    assert_eq!(fixture.raw_version_file(), before);
    assert_eq!(ctx.version, Some(v(1, 2, 5)));
}

#[test]
fn failed_save_aborts_before_git() {
    let mut fixture = Fixture::new().with_git(true, true, true);
    fixture.config.version_file =
        fixture.dir.path().join("missing").join("VERSION");

    let mut runner = runner_with_build(true);
    runner.expect_capture().never();
    let uploader = MockUploader::new();

    let mut ctx = ReleaseContext::new(&fixture.config, &runner, &uploader, None);
    let outcome = ctx.run(Intent::Major, &[]).unwrap();

    assert_eq!(outcome.aborted_at(), Some(Step::VersionSave));
    assert_eq!(outcome.status(Step::Commit), None);
}
