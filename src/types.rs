use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Which half of the reconstruction a stage belongs to.
///
/// `Sparse` stages produce camera poses and the sparse cloud; `Dense` stages
/// consume them. `--skip-dense` drops every `Dense` stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Sparse,
    Dense,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Sparse => write!(f, "sparse"),
            Phase::Dense => write!(f, "dense"),
        }
    }
}

/// Built-in stage table used when no `--stages` file is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenseBackend {
    /// COLMAP sparse phase followed by the OpenMVS executables.
    #[default]
    OpenMvs,
    /// COLMAP for both phases (undistort, patch-match, fusion, poisson).
    Colmap,
}

impl FromStr for DenseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openmvs" => Ok(DenseBackend::OpenMvs),
            "colmap" => Ok(DenseBackend::Colmap),
            other => Err(format!(
                "invalid dense backend: {other} (expected \"openmvs\" or \"colmap\")"
            )),
        }
    }
}

/// How to choose among several sparse sub-models (`sparse/0`, `sparse/1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SparseModelPolicy {
    /// Lexicographically first directory name.
    #[default]
    First,
    /// Sub-model with the largest image registry file.
    Largest,
    /// Exactly one sub-model must exist.
    Single,
    /// Sub-model directory with this exact name.
    Named(String),
}

impl FromStr for SparseModelPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("sparse model policy must not be empty".to_string());
        }
        match trimmed.to_lowercase().as_str() {
            "first" => Ok(SparseModelPolicy::First),
            "largest" => Ok(SparseModelPolicy::Largest),
            "single" => Ok(SparseModelPolicy::Single),
            _ => Ok(SparseModelPolicy::Named(trimmed.to_string())),
        }
    }
}

impl fmt::Display for SparseModelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SparseModelPolicy::First => write!(f, "first"),
            SparseModelPolicy::Largest => write!(f, "largest"),
            SparseModelPolicy::Single => write!(f, "single"),
            SparseModelPolicy::Named(name) => write!(f, "named '{name}'"),
        }
    }
}
