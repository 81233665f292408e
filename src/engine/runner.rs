// src/engine/runner.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use tracing::{error, info};

use crate::config::model::{StageConfig, StageTable};
use crate::errors::{PipelineError, Result};
use crate::exec::StageExecutor;
use crate::fs::FileSystem;
use crate::layout::ProjectLayout;
use crate::stage::{self, ResolveContext, Stage};
use crate::types::Phase;

use super::sparse_model::select_sparse_model;
use super::{RunReport, RunState, RunnerOptions, StageRecord};

/// Sequential stage driver.
///
/// Owns the layout, the selected stages and the executor. One call to
/// [`StageRunner::run`] is one pipeline run: stages execute strictly in
/// order, and the first failure ends the run.
pub struct StageRunner<E: StageExecutor> {
    layout: ProjectLayout,
    stages: Vec<StageConfig>,
    options: RunnerOptions,
    fs: Arc<dyn FileSystem>,
    executor: E,
    state: RunState,
    sparse_model: Option<PathBuf>,
}

impl<E: StageExecutor> fmt::Debug for StageRunner<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRunner")
            .field("layout", &self.layout)
            .field("stages", &self.stages.len())
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<E: StageExecutor> StageRunner<E> {
    /// Select the stages to run from `table` (dropping the dense phase when
    /// `options.skip_dense` is set).
    pub fn new(
        layout: ProjectLayout,
        table: &StageTable,
        options: RunnerOptions,
        fs: Arc<dyn FileSystem>,
        executor: E,
    ) -> Self {
        let stages = table
            .stages()
            .iter()
            .filter(|s| !(options.skip_dense && s.phase == Phase::Dense))
            .cloned()
            .collect();

        Self {
            layout,
            stages,
            options,
            fs,
            executor,
            state: RunState::NotStarted,
            sparse_model: None,
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Stages this runner will execute, in order.
    pub fn planned_stages(&self) -> &[StageConfig] {
        &self.stages
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The planned stages with templates expanded, for `--dry-run`.
    ///
    /// The sparse sub-model is not known before mapping, so it is shown
    /// as `<sparse_model>` under the sparse directory.
    pub fn plan(&self) -> Result<Vec<Stage>> {
        let placeholder_model = self.layout.sparse().join("<sparse_model>");
        let ctx = ResolveContext {
            layout: &self.layout,
            threads: self.options.threads,
            sparse_model: Some(&placeholder_model),
        };
        self.stages.iter().map(|s| Stage::resolve(s, &ctx)).collect()
    }

    /// Execute every planned stage in order.
    ///
    /// Returns the report on success, or the first stage's error. The
    /// runner is single-use; a second call is an error.
    pub async fn run(&mut self) -> Result<RunReport> {
        if self.state != RunState::NotStarted {
            return Err(PipelineError::Other(anyhow!(
                "pipeline run already finished ({:?})",
                self.state
            )));
        }

        info!(
            root = %self.layout.root().display(),
            stages = self.stages.len(),
            threads = self.options.threads,
            skip_dense = self.options.skip_dense,
            "pipeline started"
        );

        if let Err(err) = self.executor.prepare(&self.stages) {
            error!(error = %err, "pipeline aborted before the first stage");
            self.state = RunState::Failed { stage: None };
            return Err(err);
        }

        let started = Instant::now();
        let mut records = Vec::with_capacity(self.stages.len());

        for index in 0..self.stages.len() {
            let name = self.stages[index].name.clone();
            self.state = RunState::Running {
                index,
                stage: name.clone(),
            };

            match self.run_stage(index).await {
                Ok(duration) => {
                    info!(
                        stage = %name,
                        elapsed_ms = duration.as_millis() as u64,
                        "stage completed"
                    );
                    records.push(StageRecord {
                        name,
                        phase: self.stages[index].phase,
                        duration,
                    });
                }
                Err(err) => {
                    error!(stage = %name, error = %err, "stage failed; aborting pipeline");
                    self.state = RunState::Failed { stage: Some(name) };
                    return Err(err);
                }
            }
        }

        self.state = RunState::Completed;
        let report = RunReport {
            stages: records,
            sparse_model: self.sparse_model.clone(),
            total: started.elapsed(),
        };
        info!(
            stages = report.stages.len(),
            elapsed_ms = report.total.as_millis() as u64,
            "pipeline completed"
        );
        Ok(report)
    }

    async fn run_stage(&mut self, index: usize) -> Result<Duration> {
        let cfg = &self.stages[index];

        if stage::needs_sparse_model(cfg) && self.sparse_model.is_none() {
            let chosen = select_sparse_model(
                self.fs.as_ref(),
                self.layout.sparse(),
                &self.options.sparse_model,
            )?;
            self.sparse_model = Some(chosen);
        }

        let ctx = ResolveContext {
            layout: &self.layout,
            threads: self.options.threads,
            sparse_model: self.sparse_model.as_deref(),
        };
        let resolved = Stage::resolve(cfg, &ctx)?;

        for condition in &resolved.preconditions {
            condition.check(self.fs.as_ref())?;
        }

        prepare_tree(self.fs.as_ref(), &resolved)?;

        info!(stage = %resolved.name, phase = %resolved.phase, "running stage");
        let started = Instant::now();
        self.executor.execute(&resolved).await?;
        Ok(started.elapsed())
    }
}

/// Create output directories and delete stale artifacts for `stage`.
fn prepare_tree(fs: &dyn FileSystem, stage: &Stage) -> Result<()> {
    for dir in &stage.create_dirs {
        fs.create_dir_all(dir)?;
    }
    for path in &stage.remove {
        if fs.is_file(path) {
            info!(stage = %stage.name, path = %path.display(), "removing stale artifact");
            fs.remove_file(path)?;
        }
    }
    Ok(())
}
