// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod layout;
pub mod logging;
pub mod stage;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::StageTable;
use crate::engine::{RunnerOptions, StageRunner, default_threads};
use crate::errors::{PipelineError, Result};
use crate::exec::{ProcessExecutor, StageExecutor, ToolResolver};
use crate::fs::RealFileSystem;
use crate::layout::ProjectLayout;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - project layout resolution
/// - stage table loading (built-in or `--stages`)
/// - runner options from CLI + `[settings]`
/// - the process executor
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let layout = ProjectLayout::resolve(&args.project_root)?;
    let table = load_stage_table(&args)?;
    let options = runner_options(&args, &table)?;

    let resolver = ToolResolver::new(args.sfm_bin_dir.clone(), args.bin_dir.clone());
    let executor = ProcessExecutor::new(resolver);
    let mut runner = StageRunner::new(
        layout,
        &table,
        options,
        Arc::new(RealFileSystem),
        executor,
    );

    if args.dry_run {
        print_dry_run(&runner)?;
        return Ok(());
    }

    if args.skip_dense {
        info!("skipping dense phase as requested");
    }

    // Ctrl-C drops the run future, which kills the current child process.
    let report = tokio::select! {
        res = runner.run() => res?,
        _ = interrupted(tokio::signal::ctrl_c()) => {
            return Err(PipelineError::Other(anyhow!("interrupted by Ctrl+C")));
        }
    };

    print!("{report}");
    if report.ran_dense() {
        let mesh = runner.layout().textured_mesh();
        if mesh.exists() {
            println!("textured mesh: {}", mesh.display());
        }
    }
    Ok(())
}

/// Resolves when `signal` fires. If the handler could not be installed it
/// never resolves, and the run goes on without interrupt support.
async fn interrupted<F>(signal: F)
where
    F: std::future::Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

fn load_stage_table(args: &CliArgs) -> Result<StageTable> {
    match &args.stages {
        Some(path) => {
            info!(path = %path.display(), "loading stage table");
            config::load_and_validate(path)
        }
        None => {
            debug!(backend = ?args.dense_backend, "using built-in stage table");
            config::builtin(args.dense_backend)
        }
    }
}

/// CLI flags override `[settings]`; anything unset falls back to defaults.
fn runner_options(args: &CliArgs, table: &StageTable) -> Result<RunnerOptions> {
    let threads = args
        .threads
        .or(table.settings.threads)
        .unwrap_or_else(default_threads);
    if threads == 0 {
        return Err(PipelineError::Configuration(
            "--threads must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(RunnerOptions {
        threads,
        skip_dense: args.skip_dense,
        sparse_model: args.sparse_model.clone(),
    })
}

/// Dry-run output: print the stage plan with resolved arguments.
fn print_dry_run<E: StageExecutor>(runner: &StageRunner<E>) -> Result<()> {
    let layout = runner.layout();
    let plan = runner.plan()?;

    println!("photopipe dry-run");
    println!("  project root = {}", layout.root().display());
    println!();

    println!("stages ({}):", plan.len());
    for (idx, stage) in plan.iter().enumerate() {
        println!("  {}. {} [{}]", idx + 1, stage.name, stage.phase);
        println!("      cmd: {}", stage.command_line());
        for condition in &stage.preconditions {
            println!("      requires: {}", relative(layout, condition.path()));
        }
        for dir in &stage.create_dirs {
            println!("      creates: {}", relative(layout, dir));
        }
        for path in &stage.remove {
            println!("      removes: {}", relative(layout, path));
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}

fn relative(layout: &ProjectLayout, path: &Path) -> String {
    match path.strip_prefix(layout.root()) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
        _ => path.display().to_string(),
    }
}
