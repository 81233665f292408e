// src/stage/template.rs

//! `{placeholder}` expansion for argument and path templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::{PipelineError, Result};
use crate::layout::LAYOUT_PLACEHOLDERS;

/// Placeholder for the selected sparse sub-model directory.
pub const SPARSE_MODEL: &str = "sparse_model";
/// Placeholder for the tool thread count.
pub const THREADS: &str = "threads";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder regex is valid")
});

/// Is `name` a placeholder the runner knows how to fill?
pub fn is_known(name: &str) -> bool {
    name == SPARSE_MODEL || name == THREADS || LAYOUT_PLACEHOLDERS.contains(&name)
}

/// Placeholder names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
}

/// Does `template` reference `name`?
pub fn mentions(template: &str, name: &str) -> bool {
    placeholders(template).any(|p| p == name)
}

/// Replace every `{name}` in `template` using `lookup`.
///
/// A placeholder the lookup cannot fill is a configuration error; load-time
/// validation makes this unreachable for unknown names, so in practice it
/// only fires when a lazily-resolved value was not provided.
pub fn render<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Option<String> = None;
    let rendered = PLACEHOLDER_RE.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match lookup(name) {
            Some(value) => value,
            None => {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                caps[0].to_string()
            }
        }
    });

    match missing {
        Some(name) => Err(PipelineError::Configuration(format!(
            "no value for placeholder '{{{name}}}' in template \"{template}\""
        ))),
        None => Ok(rendered.into_owned()),
    }
}
