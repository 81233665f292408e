// src/config/model.rs

use serde::Deserialize;

use crate::types::Phase;

/// Stage table as read from TOML, before validation.
///
/// ```toml
/// [settings]
/// threads = 8
///
/// [[stage]]
/// name = "feature_extraction"
/// phase = "sparse"
/// tool = "colmap"
/// args = ["feature_extractor", "--database_path", "{database}", "--image_path", "{images}"]
/// requires = [{ non_empty_dir = "{images}" }]
/// remove = ["{database}"]
///
/// [[stage]]
/// name = "sequential_matching"
/// phase = "sparse"
/// tool = "colmap"
/// args = ["sequential_matcher", "--database_path", "{database}"]
/// ```
///
/// Entries run in file order unless `after` says otherwise; see
/// [`StageTable`] for the checked form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStageTable {
    #[serde(default)]
    pub settings: SettingsSection,

    #[serde(default)]
    pub stage: Vec<StageConfig>,
}

/// `[settings]` section: defaults the CLI may override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsSection {
    /// Value substituted for `{threads}`.
    #[serde(default)]
    pub threads: Option<usize>,
}

/// One `[[stage]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageConfig {
    pub name: String,

    pub phase: Phase,

    /// Executable base name, resolved against the toolchain bin dir or `PATH`.
    pub tool: String,

    /// Argument template; `{placeholder}`s are filled from the project layout.
    #[serde(default)]
    pub args: Vec<String>,

    /// Declared predecessor. Defaults to the previous `[[stage]]` entry.
    #[serde(default)]
    pub after: Option<String>,

    /// Conditions checked right before the stage is invoked.
    #[serde(default)]
    pub requires: Vec<RequirementConfig>,

    /// Directories created (idempotently) before the stage runs.
    #[serde(default)]
    pub create_dirs: Vec<String>,

    /// Stale artifacts deleted before the stage runs, if present.
    #[serde(default)]
    pub remove: Vec<String>,

    /// Working directory for the child process. Defaults to the project root.
    #[serde(default)]
    pub working_dir: Option<String>,
}

/// A precondition template, written as a one-key inline table:
/// `{ file = "{sparse}/cameras.txt" }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementConfig {
    File(String),
    Dir(String),
    NonEmptyDir(String),
}

impl RequirementConfig {
    pub fn template(&self) -> &str {
        match self {
            RequirementConfig::File(t)
            | RequirementConfig::Dir(t)
            | RequirementConfig::NonEmptyDir(t) => t,
        }
    }
}

impl StageConfig {
    /// Every template string carried by this stage, for placeholder checks.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.args
            .iter()
            .map(String::as_str)
            .chain(self.requires.iter().map(RequirementConfig::template))
            .chain(self.create_dirs.iter().map(String::as_str))
            .chain(self.remove.iter().map(String::as_str))
            .chain(self.working_dir.as_deref())
    }
}

/// Validated stage table.
///
/// Guarantees: at least one stage, unique names, only known placeholders,
/// `stages` is in execution order (a single predecessor chain) and every
/// sparse stage comes before every dense stage.
#[derive(Debug, Clone)]
pub struct StageTable {
    pub settings: SettingsSection,
    stages: Vec<StageConfig>,
}

impl StageTable {
    /// Wrap already-ordered, already-checked stages.
    ///
    /// Only the validation code should call this; everyone else goes through
    /// `StageTable::try_from(raw)`.
    pub(crate) fn new_unchecked(settings: SettingsSection, stages: Vec<StageConfig>) -> Self {
        Self { settings, stages }
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[StageConfig] {
        &self.stages
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }
}
