// src/config/mod.rs

//! Stage table loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a table from disk or from the built-in copies (`loader.rs`).
//! - Validate names, placeholders and the stage chain (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{builtin, load_and_validate, load_from_path};
pub use model::{RawStageTable, RequirementConfig, SettingsSection, StageConfig, StageTable};
