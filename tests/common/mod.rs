#![allow(dead_code)]

use std::sync::Arc;

use photopipe::config::{StageTable, builtin};
use photopipe::engine::{RunnerOptions, StageRunner};
use photopipe::fs::mock::MockFileSystem;
use photopipe::layout::ProjectLayout;
use photopipe::types::{DenseBackend, SparseModelPolicy};
use photopipe_test_utils::fake_executor::RecordingExecutor;

// Not every test binary uses every helper.
#[allow(unused_imports)]
pub use photopipe_test_utils::{init_tracing, mock_project, with_timeout};

/// Sparse phase shared by both built-in tables.
pub const SPARSE_STAGES: &[&str] = &[
    "feature_extraction",
    "sequential_matching",
    "mapping",
    "model_conversion",
];

pub const OPENMVS_DENSE: &[&str] = &[
    "interface_colmap",
    "densify_point_cloud",
    "reconstruct_mesh",
    "refine_mesh",
    "texture_mesh",
];

pub fn options(skip_dense: bool) -> RunnerOptions {
    RunnerOptions {
        threads: 4,
        skip_dense,
        sparse_model: SparseModelPolicy::First,
    }
}

pub fn openmvs_table() -> StageTable {
    builtin(DenseBackend::OpenMvs).expect("built-in openmvs table is valid")
}

/// Fake executor whose stages leave behind the files the real tools would,
/// so every precondition of the built-in OpenMVS table is satisfied.
pub fn openmvs_executor(fs: &MockFileSystem, layout: &ProjectLayout) -> RecordingExecutor {
    let root = layout.root();
    let sparse = layout.sparse();
    RecordingExecutor::new()
        .with_fs(fs.clone())
        .produces("feature_extraction", layout.database())
        .produces("mapping", sparse.join("0").join("cameras.bin"))
        .produces("mapping", sparse.join("0").join("images.bin"))
        .produces("model_conversion", sparse.join("cameras.txt"))
        .produces("model_conversion", sparse.join("images.txt"))
        .produces("interface_colmap", root.join("scene_colmap.mvs"))
        .produces("densify_point_cloud", root.join("scene_dense.mvs"))
        .produces("reconstruct_mesh", root.join("scene_mesh.mvs"))
        .produces("refine_mesh", root.join("scene_mesh_refined.mvs"))
        .produces("texture_mesh", layout.textured_mesh())
}

pub fn runner(
    fs: &MockFileSystem,
    layout: &ProjectLayout,
    table: &StageTable,
    options: RunnerOptions,
    executor: RecordingExecutor,
) -> StageRunner<RecordingExecutor> {
    StageRunner::new(
        layout.clone(),
        table,
        options,
        Arc::new(fs.clone()),
        executor,
    )
}
