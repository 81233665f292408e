// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawStageTable, StageTable};
use crate::errors::Result;
use crate::types::DenseBackend;

const OPENMVS_STAGES: &str = include_str!("stages/openmvs.toml");
const COLMAP_STAGES: &str = include_str!("stages/colmap.toml");

/// Parse a stage table from TOML text without semantic validation.
pub fn parse_raw(contents: &str) -> Result<RawStageTable> {
    let table: RawStageTable = toml::from_str(contents)?;
    Ok(table)
}

/// Load a stage table file from a given path and return the raw
/// `RawStageTable`.
///
/// This only performs TOML deserialization; it does **not** check ordering
/// or placeholders. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawStageTable> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_raw(&contents)
}

/// Load a stage table file and validate it.
///
/// This is the recommended entry point for user-supplied tables:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde`).
/// - Checks names, placeholders, the predecessor chain and phase order.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<StageTable> {
    let raw = load_from_path(&path)?;
    StageTable::try_from(raw)
}

/// One of the stage tables embedded in the binary.
pub fn builtin(backend: DenseBackend) -> Result<StageTable> {
    let source = match backend {
        DenseBackend::OpenMvs => OPENMVS_STAGES,
        DenseBackend::Colmap => COLMAP_STAGES,
    };
    StageTable::try_from(parse_raw(source)?)
}
