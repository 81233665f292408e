// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `StageExecutor` trait and the production
//!   `ProcessExecutor`; tests substitute their own executor.
//! - [`process`] runs one stage as a `tokio::process::Command` and turns a
//!   non-zero exit into a `StageExecution` error.
//! - [`tools`] maps tool names to executables (bin dirs, `PATH`).

pub mod backend;
pub mod process;
pub mod tools;

pub use backend::{ProcessExecutor, StageExecutor};
pub use process::run_stage_process;
pub use tools::ToolResolver;
