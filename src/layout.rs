// src/layout.rs

//! Project directory layout.
//!
//! Every path the pipeline touches is derived from one root:
//!
//! ```text
//! <root>/
//!   images/                 input frames
//!   database.db             feature database
//!   sparse/                 sub-models (0/, 1/, ...) + TXT export
//!   dense/                  dense workspace
//!   scene_colmap.mvs        ... OpenMVS scenes
//!   scene.obj               textured mesh
//! ```

use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Paths derived deterministically from a project root.
///
/// Fields are private; the only way to get a layout is from a root, so no
/// path can drift away from the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    images: PathBuf,
    database: PathBuf,
    sparse: PathBuf,
    dense: PathBuf,
    scene_colmap: PathBuf,
    scene_dense: PathBuf,
    scene_mesh: PathBuf,
    scene_mesh_refined: PathBuf,
    textured_mesh: PathBuf,
    fused_cloud: PathBuf,
    poisson_mesh: PathBuf,
}

/// Placeholder names backed directly by a layout path.
pub const LAYOUT_PLACEHOLDERS: &[&str] = &[
    "root",
    "images",
    "database",
    "sparse",
    "dense",
    "scene_colmap",
    "scene_dense",
    "scene_mesh",
    "scene_mesh_refined",
    "textured_mesh",
    "fused_cloud",
    "poisson_mesh",
];

impl ProjectLayout {
    /// Build the layout for `root` as given (no filesystem access).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dense = root.join("dense");
        Self {
            images: root.join("images"),
            database: root.join("database.db"),
            sparse: root.join("sparse"),
            scene_colmap: root.join("scene_colmap.mvs"),
            scene_dense: root.join("scene_dense.mvs"),
            scene_mesh: root.join("scene_mesh.mvs"),
            scene_mesh_refined: root.join("scene_mesh_refined.mvs"),
            textured_mesh: root.join("scene.obj"),
            fused_cloud: dense.join("fused.ply"),
            poisson_mesh: dense.join("meshed-poisson.ply"),
            dense,
            root,
        }
    }

    /// Build the layout for `root` made absolute against the current
    /// directory, so the paths handed to external tools do not depend on
    /// their working directory.
    pub fn resolve(root: impl AsRef<Path>) -> Result<Self> {
        let abs = std::path::absolute(root.as_ref())?;
        Ok(Self::new(abs))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images(&self) -> &Path {
        &self.images
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    pub fn sparse(&self) -> &Path {
        &self.sparse
    }

    pub fn dense(&self) -> &Path {
        &self.dense
    }

    pub fn textured_mesh(&self) -> &Path {
        &self.textured_mesh
    }

    /// Look up a layout-backed placeholder by name.
    pub fn placeholder(&self, name: &str) -> Option<&Path> {
        let path = match name {
            "root" => &self.root,
            "images" => &self.images,
            "database" => &self.database,
            "sparse" => &self.sparse,
            "dense" => &self.dense,
            "scene_colmap" => &self.scene_colmap,
            "scene_dense" => &self.scene_dense,
            "scene_mesh" => &self.scene_mesh,
            "scene_mesh_refined" => &self.scene_mesh_refined,
            "textured_mesh" => &self.textured_mesh,
            "fused_cloud" => &self.fused_cloud,
            "poisson_mesh" => &self.poisson_mesh,
            _ => return None,
        };
        Some(path.as_path())
    }
}
