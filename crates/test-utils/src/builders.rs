#![allow(dead_code)]

use photopipe::config::{RawStageTable, RequirementConfig, SettingsSection, StageConfig, StageTable};
use photopipe::types::Phase;

/// Builder for `StageTable` to simplify test setup.
pub struct StageTableBuilder {
    table: RawStageTable,
}

impl StageTableBuilder {
    pub fn new() -> Self {
        Self {
            table: RawStageTable {
                settings: SettingsSection::default(),
                stage: Vec::new(),
            },
        }
    }

    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.table.stage.push(stage);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.table.settings.threads = Some(threads);
        self
    }

    /// The unvalidated table, for tests that exercise validation itself.
    pub fn raw(self) -> RawStageTable {
        self.table
    }

    pub fn build(self) -> StageTable {
        StageTable::try_from(self.table).expect("Failed to build valid stage table from builder")
    }
}

impl Default for StageTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `StageConfig`.
pub struct StageConfigBuilder {
    stage: StageConfig,
}

impl StageConfigBuilder {
    pub fn new(name: &str, phase: Phase, tool: &str) -> Self {
        Self {
            stage: StageConfig {
                name: name.to_string(),
                phase,
                tool: tool.to_string(),
                args: vec![],
                after: None,
                requires: vec![],
                create_dirs: vec![],
                remove: vec![],
                working_dir: None,
            },
        }
    }

    pub fn sparse(name: &str) -> Self {
        Self::new(name, Phase::Sparse, "colmap")
    }

    pub fn dense(name: &str) -> Self {
        Self::new(name, Phase::Dense, name)
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.stage.args.push(arg.to_string());
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.stage.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.stage.after = Some(dep.to_string());
        self
    }

    pub fn requires_file(mut self, template: &str) -> Self {
        self.stage
            .requires
            .push(RequirementConfig::File(template.to_string()));
        self
    }

    pub fn requires_dir(mut self, template: &str) -> Self {
        self.stage
            .requires
            .push(RequirementConfig::Dir(template.to_string()));
        self
    }

    pub fn requires_non_empty_dir(mut self, template: &str) -> Self {
        self.stage
            .requires
            .push(RequirementConfig::NonEmptyDir(template.to_string()));
        self
    }

    pub fn create_dir(mut self, template: &str) -> Self {
        self.stage.create_dirs.push(template.to_string());
        self
    }

    pub fn remove(mut self, template: &str) -> Self {
        self.stage.remove.push(template.to_string());
        self
    }

    pub fn working_dir(mut self, template: &str) -> Self {
        self.stage.working_dir = Some(template.to_string());
        self
    }

    pub fn build(self) -> StageConfig {
        self.stage
    }
}
