// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{DenseBackend, SparseModelPolicy};

/// Command-line arguments for `photopipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "photopipe",
    version,
    about = "Run COLMAP + OpenMVS over a project directory: images -> sparse model -> dense cloud -> textured mesh.",
    long_about = None
)]
pub struct CliArgs {
    /// Project root; must contain `images/`.
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub project_root: PathBuf,

    /// Directory containing the dense toolchain binaries
    /// (InterfaceCOLMAP, DensifyPointCloud, ...). Defaults to `PATH` lookup.
    #[arg(long, alias = "openmvs-bin", value_name = "DIR")]
    pub bin_dir: Option<PathBuf>,

    /// Directory containing the SfM toolchain binary (`colmap`).
    /// Defaults to `PATH` lookup.
    #[arg(long, value_name = "DIR")]
    pub sfm_bin_dir: Option<PathBuf>,

    /// Run only the sparse (SfM) phase.
    #[arg(long, alias = "skip-mvs")]
    pub skip_dense: bool,

    /// Built-in stage table to use for the dense phase (openmvs, colmap).
    #[arg(long, value_name = "BACKEND", default_value = "openmvs")]
    pub dense_backend: DenseBackend,

    /// Stage table (TOML) replacing the built-in one.
    #[arg(long, value_name = "PATH")]
    pub stages: Option<PathBuf>,

    /// Thread count handed to the external tools.
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Sparse sub-model choice: first, largest, single, or a directory name.
    #[arg(long, value_name = "POLICY", default_value = "first")]
    pub sparse_model: SparseModelPolicy,

    /// Print the resolved stage plan without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PHOTOPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
