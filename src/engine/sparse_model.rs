// src/engine/sparse_model.rs

//! Picking one sparse sub-model out of `sparse/`.
//!
//! The mapper writes one directory per disconnected reconstruction
//! (`sparse/0`, `sparse/1`, ...). Which one feeds the dense phase is a
//! [`SparseModelPolicy`] chosen by the caller.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::types::SparseModelPolicy;

/// Sub-model directories under `sparse_dir`, sorted by path.
pub fn list_sparse_models(fs: &dyn FileSystem, sparse_dir: &Path) -> Result<Vec<PathBuf>> {
    if !fs.is_dir(sparse_dir) {
        return Err(PipelineError::Precondition(format!(
            "sparse model directory not found: {}",
            sparse_dir.display()
        )));
    }
    let mut models: Vec<PathBuf> = fs
        .read_dir(sparse_dir)?
        .into_iter()
        .filter(|p| fs.is_dir(p))
        .collect();
    models.sort();
    Ok(models)
}

pub fn select_sparse_model(
    fs: &dyn FileSystem,
    sparse_dir: &Path,
    policy: &SparseModelPolicy,
) -> Result<PathBuf> {
    let models = list_sparse_models(fs, sparse_dir)?;
    if models.is_empty() {
        return Err(PipelineError::Precondition(format!(
            "no sparse reconstructions found in {}",
            sparse_dir.display()
        )));
    }

    let chosen = match policy {
        SparseModelPolicy::First => {
            if models.len() > 1 {
                warn!(
                    count = models.len(),
                    candidates = %display_names(&models),
                    "mapper produced several sparse sub-models; using the first (see --sparse-model)"
                );
            }
            models[0].clone()
        }
        SparseModelPolicy::Largest => largest_model(fs, &models),
        SparseModelPolicy::Single => {
            if models.len() > 1 {
                return Err(PipelineError::Precondition(format!(
                    "expected exactly one sparse sub-model in {}, found {}: {}",
                    sparse_dir.display(),
                    models.len(),
                    display_names(&models)
                )));
            }
            models[0].clone()
        }
        SparseModelPolicy::Named(name) => {
            let wanted = sparse_dir.join(name);
            if !models.contains(&wanted) {
                return Err(PipelineError::Precondition(format!(
                    "sparse sub-model '{}' not found in {} (available: {})",
                    name,
                    sparse_dir.display(),
                    display_names(&models)
                )));
            }
            wanted
        }
    };

    info!(
        model = %chosen.display(),
        policy = %policy,
        "selected sparse sub-model"
    );
    Ok(chosen)
}

/// Sub-model whose image registry is largest; ties go to the earlier path.
fn largest_model(fs: &dyn FileSystem, models: &[PathBuf]) -> PathBuf {
    let mut best = &models[0];
    let mut best_size = registry_size(fs, best);
    for model in &models[1..] {
        let size = registry_size(fs, model);
        if size > best_size {
            best = model;
            best_size = size;
        }
    }
    best.clone()
}

fn registry_size(fs: &dyn FileSystem, model: &Path) -> u64 {
    ["images.bin", "images.txt"]
        .iter()
        .map(|f| model.join(f))
        .find(|p| fs.is_file(p))
        .and_then(|p| fs.file_len(&p).ok())
        .unwrap_or(0)
}

fn display_names(models: &[PathBuf]) -> String {
    models
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(", ")
}
