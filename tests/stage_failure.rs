// tests/stage_failure.rs

mod common;
use crate::common::*;

use photopipe::engine::RunState;
use photopipe::errors::PipelineError;

#[tokio::test]
async fn failing_stage_stops_the_pipeline() {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 3);
    let table = openmvs_table();
    let executor = openmvs_executor(&fs, &layout).failing_at(
        "mapping",
        1,
        "No good initial image pair found.",
    );
    let mut runner = runner(&fs, &layout, &table, options(false), executor);

    let err = with_timeout(runner.run()).await.unwrap_err();

    match &err {
        PipelineError::StageExecution {
            stage,
            code,
            diagnostic,
        } => {
            assert_eq!(stage, "mapping");
            assert_eq!(*code, Some(1));
            assert!(diagnostic.contains("initial image pair"));
        }
        other => panic!("expected StageExecution, got {other:?}"),
    }
    assert_eq!(err.stage(), Some("mapping"));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(
        runner.executor().invoked_names(),
        vec!["feature_extraction", "sequential_matching", "mapping"]
    );
    assert_eq!(
        runner.state(),
        &RunState::Failed {
            stage: Some("mapping".to_string())
        }
    );
}

#[tokio::test]
async fn dense_failure_keeps_sparse_results() {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 3);
    let table = openmvs_table();
    let executor = openmvs_executor(&fs, &layout).failing_at("refine_mesh", 137, "killed");
    let mut runner = runner(&fs, &layout, &table, options(false), executor);

    let err = with_timeout(runner.run()).await.unwrap_err();

    assert_eq!(err.stage(), Some("refine_mesh"));
    let invoked = runner.executor().invoked_names();
    assert_eq!(invoked.len(), SPARSE_STAGES.len() + 4);
    assert_eq!(invoked.last().map(String::as_str), Some("refine_mesh"));
    assert!(!invoked.iter().any(|n| n == "texture_mesh"));
}

#[tokio::test]
async fn missing_tool_aborts_before_any_stage() {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 3);
    let table = openmvs_table();
    let executor = openmvs_executor(&fs, &layout).missing_tool("DensifyPointCloud");
    let mut runner = runner(&fs, &layout, &table, options(false), executor);

    let err = with_timeout(runner.run()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Configuration(_)), "got {err:?}");
    assert_eq!(err.exit_code(), 4);
    assert!(runner.executor().invoked_names().is_empty());
    assert_eq!(runner.state(), &RunState::Failed { stage: None });
}
