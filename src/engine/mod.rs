// src/engine/mod.rs

//! Pipeline engine.
//!
//! - [`runner`] drives the ordered stage list against an executor.
//! - [`sparse_model`] picks the sparse sub-model handed to later stages.
//!
//! A run moves through [`RunState`]:
//!
//! ```text
//! NotStarted -> Running(0) -> Running(1) -> ... -> Completed
//!                    \             \
//!                     Failed        Failed
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::types::{Phase, SparseModelPolicy};

pub mod runner;
pub mod sparse_model;

pub use runner::StageRunner;
pub use sparse_model::{list_sparse_models, select_sparse_model};

/// Options handed to the runner at construction.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Value for `{threads}`.
    pub threads: usize,
    /// Drop every dense-phase stage.
    pub skip_dense: bool,
    pub sparse_model: SparseModelPolicy,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            skip_dense: false,
            sparse_model: SparseModelPolicy::default(),
        }
    }
}

/// Thread count used when neither the CLI nor the stage table sets one.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running { index: usize, stage: String },
    Completed,
    /// `stage` is `None` when the run failed before any stage started
    /// (e.g. a tool could not be located).
    Failed { stage: Option<String> },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed { .. })
    }
}

/// One completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub name: String,
    pub phase: Phase,
    pub duration: Duration,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub stages: Vec<StageRecord>,
    pub sparse_model: Option<PathBuf>,
    pub total: Duration,
}

impl RunReport {
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn ran_dense(&self) -> bool {
        self.stages.iter().any(|s| s.phase == Phase::Dense)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "completed {} stage(s) in {:.1}s",
            self.stages.len(),
            self.total.as_secs_f64()
        )?;
        for record in &self.stages {
            writeln!(
                f,
                "  {:<24} {:<6} {:>8.1}s",
                record.name,
                record.phase.to_string(),
                record.duration.as_secs_f64()
            )?;
        }
        if let Some(model) = &self.sparse_model {
            writeln!(f, "sparse model: {}", model.display())?;
        }
        Ok(())
    }
}
