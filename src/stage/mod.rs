// src/stage/mod.rs

//! Resolved stages.
//!
//! A [`StageConfig`] carries templates; a [`Stage`] is the same entry with
//! every `{placeholder}` filled from the project layout and run options.
//! Resolution happens right before the stage runs, because `{sparse_model}`
//! only has a value once mapping has produced sub-models.

pub mod precondition;
pub mod template;

use std::path::{Path, PathBuf};

use crate::config::model::{RequirementConfig, StageConfig};
use crate::errors::Result;
use crate::layout::ProjectLayout;
use crate::types::Phase;

pub use precondition::Precondition;

/// Values available to template expansion.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub layout: &'a ProjectLayout,
    pub threads: usize,
    /// Selected sparse sub-model, once known.
    pub sparse_model: Option<&'a Path>,
}

impl ResolveContext<'_> {
    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            template::THREADS => Some(self.threads.to_string()),
            template::SPARSE_MODEL => self.sparse_model.map(|p| p.display().to_string()),
            other => self
                .layout
                .placeholder(other)
                .map(|p| p.display().to_string()),
        }
    }

    fn render(&self, template: &str) -> Result<String> {
        template::render(template, |name| self.lookup(name))
    }

    fn render_path(&self, template: &str) -> Result<PathBuf> {
        self.render(template).map(PathBuf::from)
    }
}

/// A stage with all templates expanded, ready to hand to an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub phase: Phase,
    pub tool: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub preconditions: Vec<Precondition>,
    pub create_dirs: Vec<PathBuf>,
    pub remove: Vec<PathBuf>,
}

impl Stage {
    pub fn resolve(cfg: &StageConfig, ctx: &ResolveContext<'_>) -> Result<Self> {
        let args = cfg
            .args
            .iter()
            .map(|a| ctx.render(a))
            .collect::<Result<Vec<_>>>()?;

        let preconditions = cfg
            .requires
            .iter()
            .map(|req| {
                let path = ctx.render_path(req.template())?;
                Ok(match req {
                    RequirementConfig::File(_) => Precondition::FileExists(path),
                    RequirementConfig::Dir(_) => Precondition::DirExists(path),
                    RequirementConfig::NonEmptyDir(_) => Precondition::NonEmptyDir(path),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let create_dirs = cfg
            .create_dirs
            .iter()
            .map(|d| ctx.render_path(d))
            .collect::<Result<Vec<_>>>()?;

        let remove = cfg
            .remove
            .iter()
            .map(|r| ctx.render_path(r))
            .collect::<Result<Vec<_>>>()?;

        let working_dir = match cfg.working_dir.as_deref() {
            Some(t) => ctx.render_path(t)?,
            None => ctx.layout.root().to_path_buf(),
        };

        Ok(Self {
            name: cfg.name.clone(),
            phase: cfg.phase,
            tool: cfg.tool.clone(),
            args,
            working_dir,
            preconditions,
            create_dirs,
            remove,
        })
    }

    /// Shell-like one-line rendering for logs and `--dry-run`.
    pub fn command_line(&self) -> String {
        let mut line = self.tool.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Does any template of this stage need the selected sparse sub-model?
pub fn needs_sparse_model(cfg: &StageConfig) -> bool {
    cfg.templates()
        .any(|t| template::mentions(t, template::SPARSE_MODEL))
}
