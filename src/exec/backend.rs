// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runner talks to a `StageExecutor` instead of spawning processes
//! itself. Production uses [`ProcessExecutor`]; tests provide an executor
//! that records invocations and fails on demand.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tracing::debug;

use crate::config::model::StageConfig;
use crate::errors::Result;
use crate::stage::Stage;
use crate::types::Phase;

use super::process::run_stage_process;
use super::tools::ToolResolver;

/// Trait abstracting how a resolved stage is executed.
pub trait StageExecutor: Send {
    /// Called once with every stage selected for the run, before the first
    /// one starts. Unusable tool setups should fail here, so that nothing
    /// runs at all.
    fn prepare(&mut self, _stages: &[StageConfig]) -> Result<()> {
        Ok(())
    }

    /// Run one stage to completion.
    ///
    /// Failure must be reported as `PipelineError::StageExecution` naming
    /// `stage.name`.
    fn execute<'a>(
        &'a mut self,
        stage: &'a Stage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Executor that runs each stage as a child process.
#[derive(Debug)]
pub struct ProcessExecutor {
    resolver: ToolResolver,
    resolved: HashMap<(String, Phase), PathBuf>,
}

impl ProcessExecutor {
    pub fn new(resolver: ToolResolver) -> Self {
        Self {
            resolver,
            resolved: HashMap::new(),
        }
    }

    fn program_for(&mut self, tool: &str, phase: Phase) -> Result<PathBuf> {
        let key = (tool.to_string(), phase);
        if let Some(path) = self.resolved.get(&key) {
            return Ok(path.clone());
        }
        let path = self.resolver.resolve(tool, phase)?;
        self.resolved.insert(key, path.clone());
        Ok(path)
    }
}

impl StageExecutor for ProcessExecutor {
    fn prepare(&mut self, stages: &[StageConfig]) -> Result<()> {
        for stage in stages {
            let path = self.program_for(&stage.tool, stage.phase)?;
            debug!(
                stage = %stage.name,
                tool = %stage.tool,
                path = %path.display(),
                "resolved tool"
            );
        }
        Ok(())
    }

    fn execute<'a>(
        &'a mut self,
        stage: &'a Stage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let program = self.program_for(&stage.tool, stage.phase)?;
            run_stage_process(&program, stage).await
        })
    }
}
