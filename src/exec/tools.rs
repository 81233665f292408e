// src/exec/tools.rs

//! Locating external tool executables.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::errors::{PipelineError, Result};
use crate::types::Phase;

/// Resolves a tool base name (`colmap`, `DensifyPointCloud`, ...) to an
/// executable path.
///
/// - sparse-phase tools look in `sfm_bin_dir`, dense-phase tools in
///   `dense_bin_dir`;
/// - without a directory for the phase, `PATH` is searched.
#[derive(Debug, Clone, Default)]
pub struct ToolResolver {
    sfm_bin_dir: Option<PathBuf>,
    dense_bin_dir: Option<PathBuf>,
    search_path: Option<OsString>,
}

impl ToolResolver {
    /// Resolver using the process `PATH` for lookups.
    pub fn new(sfm_bin_dir: Option<PathBuf>, dense_bin_dir: Option<PathBuf>) -> Self {
        Self {
            sfm_bin_dir,
            dense_bin_dir,
            search_path: std::env::var_os("PATH"),
        }
    }

    /// Replace the search path (tests use this instead of mutating `PATH`).
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn resolve(&self, tool: &str, phase: Phase) -> Result<PathBuf> {
        let exe = exe_name(tool);

        // Explicit paths are taken as-is.
        let direct = Path::new(tool);
        if direct.components().count() > 1 {
            if direct.is_file() {
                return Ok(direct.to_path_buf());
            }
            return Err(PipelineError::Configuration(format!(
                "tool '{}' not found at {}",
                tool,
                direct.display()
            )));
        }

        let bin_dir = match phase {
            Phase::Sparse => self.sfm_bin_dir.as_deref(),
            Phase::Dense => self.dense_bin_dir.as_deref(),
        };

        if let Some(dir) = bin_dir {
            let candidate = dir.join(&exe);
            if candidate.is_file() {
                return Ok(candidate);
            }
            return Err(PipelineError::Configuration(format!(
                "{} tool '{}' not found in {}",
                phase,
                exe,
                dir.display()
            )));
        }

        let found = self
            .search_path
            .as_ref()
            .into_iter()
            .flat_map(|paths| std::env::split_paths(paths))
            .map(|dir| dir.join(&exe))
            .find(|candidate| candidate.is_file());

        found.ok_or_else(|| {
            PipelineError::Configuration(format!(
                "{} tool '{}' not found on PATH; pass {} to point at it",
                phase,
                exe,
                match phase {
                    Phase::Sparse => "--sfm-bin-dir",
                    Phase::Dense => "--bin-dir",
                }
            ))
        })
    }
}

/// Platform executable name for a tool base name.
pub fn exe_name(tool: &str) -> String {
    if cfg!(windows) && !tool.to_lowercase().ends_with(".exe") {
        format!("{tool}.exe")
    } else {
        tool.to_string()
    }
}
