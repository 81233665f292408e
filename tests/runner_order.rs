// tests/runner_order.rs

mod common;
use crate::common::*;

use std::path::{Path, PathBuf};

use photopipe::engine::RunState;
use photopipe::fs::FileSystem;
use photopipe_test_utils::builders::{StageConfigBuilder, StageTableBuilder};
use photopipe_test_utils::fake_executor::RecordingExecutor;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test]
async fn full_openmvs_run_invokes_every_stage_in_order() -> TestResult {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 3);
    let table = openmvs_table();
    let executor = openmvs_executor(&fs, &layout);
    let mut runner = runner(&fs, &layout, &table, options(false), executor);

    let report = with_timeout(runner.run()).await?;

    let expected: Vec<&str> = SPARSE_STAGES
        .iter()
        .chain(OPENMVS_DENSE.iter())
        .copied()
        .collect();
    assert_eq!(runner.executor().invoked_names(), expected);
    assert_eq!(report.stage_names(), expected);
    assert!(report.ran_dense());
    assert_eq!(report.sparse_model, Some(PathBuf::from("/proj/sparse/0")));
    assert_eq!(runner.state(), &RunState::Completed);
    assert!(fs.is_file(Path::new("/proj/scene.obj")));

    Ok(())
}

#[tokio::test]
async fn arguments_are_resolved_from_the_layout() -> TestResult {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 1);
    let table = openmvs_table();
    let executor = openmvs_executor(&fs, &layout);
    let mut runner = runner(&fs, &layout, &table, options(false), executor);

    with_timeout(runner.run()).await?;

    let invocations = runner.executor().invocations();
    let invoked = invocations.lock().unwrap();

    let mapping = invoked.iter().find(|s| s.name == "mapping").unwrap();
    assert_eq!(mapping.tool, "colmap");
    assert_eq!(
        mapping.args,
        vec![
            "mapper",
            "--database_path",
            "/proj/database.db",
            "--image_path",
            "/proj/images",
            "--output_path",
            "/proj/sparse",
            "--Mapper.num_threads",
            "4",
        ]
    );

    let converter = invoked.iter().find(|s| s.name == "model_conversion").unwrap();
    assert!(converter.args.contains(&"/proj/sparse/0".to_string()));

    let texture = invoked.iter().find(|s| s.name == "texture_mesh").unwrap();
    assert_eq!(texture.tool, "TextureMesh");
    assert!(texture.args.contains(&"/proj/scene.obj".to_string()));
    assert_eq!(texture.working_dir, PathBuf::from("/proj"));

    Ok(())
}

#[tokio::test]
async fn stale_artifacts_are_removed_and_dirs_created_before_invocation() -> TestResult {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 2);
    fs.add_file("/proj/database.db", b"stale".to_vec());

    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::sparse("extract")
                .args(&["feature_extractor", "--database_path", "{database}"])
                .requires_non_empty_dir("{images}")
                .remove("{database}")
                .create_dir("{sparse}")
                .build(),
        )
        .build();

    let mut runner = runner(&fs, &layout, &table, options(false), RecordingExecutor::new());
    with_timeout(runner.run()).await?;

    assert!(!fs.exists(Path::new("/proj/database.db")));
    assert!(fs.is_dir(Path::new("/proj/sparse")));
    assert_eq!(runner.executor().invoked_names(), vec!["extract"]);

    Ok(())
}

#[tokio::test]
async fn sub_model_policy_is_applied_once_for_the_whole_run() -> TestResult {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 2);
    fs.add_file("/proj/sparse/0/images.bin", vec![0u8; 4]);
    fs.add_file("/proj/sparse/1/images.bin", vec![0u8; 64]);

    let table = StageTableBuilder::new()
        .with_stage(
            StageConfigBuilder::sparse("convert")
                .args(&["model_converter", "--input_path", "{sparse_model}"])
                .requires_dir("{sparse_model}")
                .build(),
        )
        .with_stage(
            StageConfigBuilder::dense("image_undistortion")
                .args(&["--input_path", "{sparse_model}"])
                .build(),
        )
        .build();

    let mut opts = options(false);
    opts.sparse_model = "largest".parse()?;
    let mut runner = runner(&fs, &layout, &table, opts, RecordingExecutor::new());
    let report = with_timeout(runner.run()).await?;

    assert_eq!(report.sparse_model, Some(PathBuf::from("/proj/sparse/1")));
    let invocations = runner.executor().invocations();
    for stage in invocations.lock().unwrap().iter() {
        assert_eq!(stage.args.last().map(String::as_str), Some("/proj/sparse/1"));
    }

    Ok(())
}

#[tokio::test]
async fn runner_is_single_use() -> TestResult {
    init_tracing();

    let (fs, layout) = mock_project("/proj", 1);
    let table = StageTableBuilder::new()
        .with_stage(StageConfigBuilder::sparse("only").build())
        .build();
    let mut runner = runner(&fs, &layout, &table, options(false), RecordingExecutor::new());

    with_timeout(runner.run()).await?;
    assert!(runner.run().await.is_err());
    assert_eq!(runner.executor().invoked_names(), vec!["only"]);

    Ok(())
}
