use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use photopipe::config::StageConfig;
use photopipe::errors::{PipelineError, Result};
use photopipe::exec::StageExecutor;
use photopipe::fs::mock::MockFileSystem;
use photopipe::stage::Stage;

/// A fake executor that:
/// - records every stage it was asked to run (fully resolved)
/// - optionally fails one named stage with a given exit code and stderr
/// - optionally "produces" files in a shared `MockFileSystem` when a stage
///   succeeds, standing in for the external tool's outputs.
#[derive(Default)]
pub struct RecordingExecutor {
    invoked: Arc<Mutex<Vec<Stage>>>,
    prepared: Arc<Mutex<Vec<String>>>,
    fail_at: Option<(String, i32, String)>,
    missing_tool: Option<String>,
    fs: Option<MockFileSystem>,
    outputs: HashMap<String, Vec<PathBuf>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stage` exit with `code`, writing `stderr`.
    pub fn failing_at(mut self, stage: &str, code: i32, stderr: &str) -> Self {
        self.fail_at = Some((stage.to_string(), code, stderr.to_string()));
        self
    }

    /// Pretend `tool` cannot be located; `prepare` fails.
    pub fn missing_tool(mut self, tool: &str) -> Self {
        self.missing_tool = Some(tool.to_string());
        self
    }

    /// Filesystem that `produces` writes into.
    pub fn with_fs(mut self, fs: MockFileSystem) -> Self {
        self.fs = Some(fs);
        self
    }

    /// When `stage` succeeds, create `path` in the shared filesystem.
    pub fn produces(mut self, stage: &str, path: impl Into<PathBuf>) -> Self {
        self.outputs
            .entry(stage.to_string())
            .or_default()
            .push(path.into());
        self
    }

    /// Shared handle to the invocation log.
    pub fn invocations(&self) -> Arc<Mutex<Vec<Stage>>> {
        Arc::clone(&self.invoked)
    }

    pub fn invoked_names(&self) -> Vec<String> {
        self.invoked
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Names of the stages passed to `prepare`.
    pub fn prepared_names(&self) -> Vec<String> {
        self.prepared.lock().unwrap().clone()
    }
}

impl StageExecutor for RecordingExecutor {
    fn prepare(&mut self, stages: &[StageConfig]) -> Result<()> {
        {
            let mut guard = self.prepared.lock().unwrap();
            guard.extend(stages.iter().map(|s| s.name.clone()));
        }
        if let Some(tool) = &self.missing_tool {
            if stages.iter().any(|s| &s.tool == tool) {
                return Err(PipelineError::Configuration(format!(
                    "tool '{tool}' not found on PATH"
                )));
            }
        }
        Ok(())
    }

    fn execute<'a>(
        &'a mut self,
        stage: &'a Stage,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            {
                let mut guard = self.invoked.lock().unwrap();
                guard.push(stage.clone());
            }

            if let Some((name, code, stderr)) = &self.fail_at {
                if name == &stage.name {
                    return Err(PipelineError::StageExecution {
                        stage: stage.name.clone(),
                        code: Some(*code),
                        diagnostic: stderr.clone(),
                    });
                }
            }

            if let (Some(fs), Some(paths)) = (&self.fs, self.outputs.get(&stage.name)) {
                for path in paths {
                    fs.add_file(path, b"output".to_vec());
                }
            }
            Ok(())
        })
    }
}
