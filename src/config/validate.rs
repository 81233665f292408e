// src/config/validate.rs

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{RawStageTable, StageConfig, StageTable};
use crate::errors::{PipelineError, Result};
use crate::stage::template;
use crate::types::Phase;

impl TryFrom<RawStageTable> for StageTable {
    type Error = PipelineError;

    fn try_from(raw: RawStageTable) -> std::result::Result<Self, Self::Error> {
        ensure_has_stages(&raw)?;
        validate_settings(&raw)?;
        validate_names(&raw)?;
        validate_placeholders(&raw)?;
        let ordered = order_stages(&raw)?;
        validate_phase_order(&ordered)?;
        Ok(StageTable::new_unchecked(raw.settings, ordered))
    }
}

fn ensure_has_stages(cfg: &RawStageTable) -> Result<()> {
    if cfg.stage.is_empty() {
        return Err(PipelineError::Configuration(
            "stage table must contain at least one [[stage]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_settings(cfg: &RawStageTable) -> Result<()> {
    if cfg.settings.threads == Some(0) {
        return Err(PipelineError::Configuration(
            "[settings].threads must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_names(cfg: &RawStageTable) -> Result<()> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (idx, stage) in cfg.stage.iter().enumerate() {
        if stage.name.trim().is_empty() {
            return Err(PipelineError::Configuration(format!(
                "stage #{} has an empty name",
                idx + 1
            )));
        }
        if stage.tool.trim().is_empty() {
            return Err(PipelineError::Configuration(format!(
                "stage '{}' has an empty tool",
                stage.name
            )));
        }
        if seen.insert(stage.name.as_str(), idx).is_some() {
            return Err(PipelineError::Configuration(format!(
                "duplicate stage name '{}'",
                stage.name
            )));
        }
    }
    Ok(())
}

fn validate_placeholders(cfg: &RawStageTable) -> Result<()> {
    for stage in cfg.stage.iter() {
        for tmpl in stage.templates() {
            if let Some(unknown) = template::placeholders(tmpl).find(|p| !template::is_known(p)) {
                return Err(PipelineError::Configuration(format!(
                    "stage '{}' uses unknown placeholder '{{{}}}' in \"{}\"",
                    stage.name, unknown, tmpl
                )));
            }
        }
    }
    Ok(())
}

/// Build the predecessor graph and return the stages in execution order.
///
/// Edge direction: predecessor -> stage. A stage without `after` follows the
/// entry above it in the file; the first entry without `after` is the root.
/// The graph must be a single chain.
fn order_stages(cfg: &RawStageTable) -> Result<Vec<StageConfig>> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for stage in cfg.stage.iter() {
        graph.add_node(stage.name.as_str());
    }

    for (idx, stage) in cfg.stage.iter().enumerate() {
        let pred = match stage.after.as_deref() {
            Some(dep) => {
                if !graph.contains_node(dep) {
                    return Err(PipelineError::Configuration(format!(
                        "stage '{}' has unknown predecessor '{}' in `after`",
                        stage.name, dep
                    )));
                }
                if dep == stage.name {
                    return Err(PipelineError::Configuration(format!(
                        "stage '{}' cannot come after itself",
                        stage.name
                    )));
                }
                Some(dep)
            }
            None if idx > 0 => Some(cfg.stage[idx - 1].name.as_str()),
            None => None,
        };

        if let Some(pred) = pred {
            graph.add_edge(pred, stage.name.as_str(), ());
        }
    }

    for node in graph.nodes() {
        let successors: Vec<&str> = graph.neighbors_directed(node, Direction::Outgoing).collect();
        if successors.len() > 1 {
            return Err(PipelineError::Configuration(format!(
                "stages must form a single chain, but {} all follow '{}'",
                quoted_list(&successors),
                node
            )));
        }
    }

    let order = match toposort(&graph, None) {
        Ok(order) => order,
        Err(cycle) => {
            return Err(PipelineError::Configuration(format!(
                "cycle detected in stage order involving stage '{}'",
                cycle.node_id()
            )));
        }
    };

    let roots: Vec<&str> = graph
        .nodes()
        .filter(|n| graph.neighbors_directed(*n, Direction::Incoming).next().is_none())
        .collect();
    if roots.len() != 1 {
        return Err(PipelineError::Configuration(format!(
            "stages must form a single chain, but {} have no predecessor",
            quoted_list(&roots)
        )));
    }

    let by_name: HashMap<&str, &StageConfig> =
        cfg.stage.iter().map(|s| (s.name.as_str(), s)).collect();
    Ok(order
        .into_iter()
        .filter_map(|name| by_name.get(name).map(|s| (*s).clone()))
        .collect())
}

fn validate_phase_order(ordered: &[StageConfig]) -> Result<()> {
    let mut first_dense: Option<&str> = None;
    for stage in ordered {
        match (stage.phase, first_dense) {
            (Phase::Dense, None) => first_dense = Some(stage.name.as_str()),
            (Phase::Sparse, Some(dense)) => {
                return Err(PipelineError::Configuration(format!(
                    "sparse stage '{}' is ordered after dense stage '{}'",
                    stage.name, dense
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

fn quoted_list(names: &[&str]) -> String {
    let mut sorted = names.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
