// tests/process_executor.rs
//
// Drives real child processes through `sh`.
#![cfg(unix)]

mod common;
use crate::common::*;

use std::sync::Arc;

use photopipe::engine::{RunState, StageRunner};
use photopipe::errors::PipelineError;
use photopipe::exec::{ProcessExecutor, ToolResolver};
use photopipe::fs::RealFileSystem;
use photopipe::layout::ProjectLayout;
use photopipe_test_utils::builders::{StageConfigBuilder, StageTableBuilder};

const SEARCH_PATH: &str = "/bin:/usr/bin";

fn shell_runner(
    layout: &ProjectLayout,
    table: &photopipe::config::StageTable,
) -> StageRunner<ProcessExecutor> {
    let resolver = ToolResolver::new(None, None).with_search_path(SEARCH_PATH);
    StageRunner::new(
        layout.clone(),
        table,
        options(false),
        Arc::new(RealFileSystem),
        ProcessExecutor::new(resolver),
    )
}

#[tokio::test]
async fn stages_run_in_the_project_root() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::new("write", photopipe::types::Phase::Sparse, "sh")
                .args(&["-c", "echo {threads} > threads.txt"])
                .build(),
        )
        .with_stage(
            StageConfigBuilder::new("check", photopipe::types::Phase::Sparse, "sh")
                .args(&["-c", "test -f threads.txt"])
                .requires_file("{root}/threads.txt")
                .build(),
        )
        .build();

    let mut runner = shell_runner(&layout, &table);
    let report = with_timeout(runner.run()).await.unwrap();

    assert_eq!(report.stage_names(), vec!["write", "check"]);
    let written = std::fs::read_to_string(dir.path().join("threads.txt")).unwrap();
    assert_eq!(written.trim(), "4");
}

#[tokio::test]
async fn non_zero_exit_carries_code_and_stderr_tail() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::new("explode", photopipe::types::Phase::Sparse, "sh")
                .args(&["-c", "echo working; echo boom >&2; exit 3"])
                .build(),
        )
        .with_stage(
            StageConfigBuilder::new("after_explode", photopipe::types::Phase::Sparse, "sh")
                .args(&["-c", "touch should_not_exist"])
                .build(),
        )
        .build();

    let mut runner = shell_runner(&layout, &table);
    let err = with_timeout(runner.run()).await.unwrap_err();

    match &err {
        PipelineError::StageExecution {
            stage,
            code,
            diagnostic,
        } => {
            assert_eq!(stage, "explode");
            assert_eq!(*code, Some(3));
            assert!(diagnostic.contains("boom"), "diagnostic: {diagnostic}");
            assert!(!diagnostic.contains("working"), "diagnostic: {diagnostic}");
        }
        other => panic!("expected StageExecution, got {other:?}"),
    }
    assert!(!dir.path().join("should_not_exist").exists());
    assert_eq!(
        runner.state(),
        &RunState::Failed {
            stage: Some("explode".to_string())
        }
    );
}

#[tokio::test]
async fn unresolvable_tool_starts_nothing() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::new("first", photopipe::types::Phase::Sparse, "sh")
                .args(&["-c", "touch first_ran"])
                .build(),
        )
        .with_stage(StageConfigBuilder::dense("NoSuchOpenMvsTool").build())
        .build();

    let mut runner = shell_runner(&layout, &table);
    let err = with_timeout(runner.run()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Configuration(_)), "got {err:?}");
    assert!(err.to_string().contains("NoSuchOpenMvsTool"), "got {err}");
    assert!(!dir.path().join("first_ran").exists());
    assert_eq!(runner.state(), &RunState::Failed { stage: None });
}

#[tokio::test]
async fn non_utf8_output_does_not_break_a_healthy_tool() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::new("latin1_names", photopipe::types::Phase::Sparse, "sh")
                .args(&[
                    "-c",
                    "printf 'caf\\351\\n'; printf 'img_\\351.jpg\\n' >&2; \
                     i=0; while [ $i -lt 2000 ]; do echo line $i; echo err $i >&2; i=$((i+1)); done; \
                     exit 0",
                ])
                .build(),
        )
        .build();

    let mut runner = shell_runner(&layout, &table);
    let report = with_timeout(runner.run()).await.unwrap();

    assert_eq!(report.stage_names(), vec!["latin1_names"]);
}

#[tokio::test]
async fn diagnostic_survives_non_utf8_stderr() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::new("mapping", photopipe::types::Phase::Sparse, "sh")
                .args(&[
                    "-c",
                    "printf 'img_\\351.jpg\\n' >&2; echo 'real error: no good initial pair' >&2; exit 1",
                ])
                .build(),
        )
        .build();

    let mut runner = shell_runner(&layout, &table);
    let err = with_timeout(runner.run()).await.unwrap_err();

    match err {
        PipelineError::StageExecution {
            stage,
            code,
            diagnostic,
        } => {
            assert_eq!(stage, "mapping");
            assert_eq!(code, Some(1));
            assert!(diagnostic.contains("img_\u{fffd}.jpg"), "diagnostic: {diagnostic}");
            assert!(
                diagnostic.contains("real error: no good initial pair"),
                "diagnostic: {diagnostic}"
            );
        }
        other => panic!("expected StageExecution, got {other:?}"),
    }
}
