// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required input path is missing or empty.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// An external tool was started but reported failure.
    #[error("Stage '{stage}' failed (exit code {code:?}):\n{diagnostic}")]
    StageExecution {
        stage: String,
        code: Option<i32>,
        diagnostic: String,
    },

    /// Stage table, CLI options or tool locations are unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Process exit status reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Precondition(_) => 2,
            PipelineError::StageExecution { .. } => 3,
            PipelineError::Configuration(_) | PipelineError::Toml(_) => 4,
            PipelineError::Io(_) | PipelineError::Other(_) => 1,
        }
    }

    /// Name of the failing stage, if the error came from a stage invocation.
    pub fn stage(&self) -> Option<&str> {
        match self {
            PipelineError::StageExecution { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipelineError>;
