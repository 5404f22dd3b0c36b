//! Normalized module graph model.
//!
//! Everything in here has already been through [`crate::ingest`]: defaults are filled in, score
//! pairs are complete or absent, and ids are validated. Layout coordinates are not
//! part of the model; they live in the layout result and are recomputed on every pass.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Radius assigned to nodes whose record carries no usable `node-radius`.
pub const DEFAULT_NODE_RADIUS: f64 = 10.0;

/// Display labels reserved for the synthetic path start/end nodes.
pub const SENTINEL_LABELS: [&str; 2] = ["start", "end"];

pub const MODULE_ID_LEN: usize = 6;

/// A validated module identifier such as `M00001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleId(String);

impl ModuleId {
    /// Trims surrounding whitespace and checks the fixed length.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.chars().count() != MODULE_ID_LEN {
            return Err(Error::InvalidModuleId {
                input: input.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ModuleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ModuleId> for String {
    fn from(value: ModuleId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub before: f64,
    pub after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub occurrence: Option<f64>,
    pub scores: Option<Scores>,
    /// Raw E-value, not yet log-transformed.
    pub significance: Option<f64>,
    pub radius: f64,
    pub radius_explicit: bool,
    pub is_sentinel: bool,
    pub group: Option<i64>,
}

impl GraphNode {
    /// A node with no attributes beyond its id, carrying the ingestion defaults.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let is_sentinel = is_sentinel_id(&id);
        Self {
            id,
            occurrence: None,
            scores: None,
            significance: None,
            radius: DEFAULT_NODE_RADIUS,
            radius_explicit: false,
            is_sentinel,
            group: None,
        }
    }

    /// The id with any `_`-introduced disambiguation suffix removed. Ids that start with `_`
    /// are shown whole.
    pub fn display_label(&self) -> &str {
        display_label(&self.id)
    }
}

pub fn display_label(id: &str) -> &str {
    match id.split('_').next() {
        Some(prefix) if !prefix.is_empty() => prefix,
        _ => id,
    }
}

pub fn is_sentinel_id(id: &str) -> bool {
    let label = display_label(id);
    SENTINEL_LABELS
        .iter()
        .any(|s| label.eq_ignore_ascii_case(s))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub occurrence: f64,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, occurrence: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            occurrence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPathRecord {
    pub path_label: String,
    pub aggregate_before: Option<f64>,
    pub aggregate_after: Option<f64>,
    pub path_id: Option<i64>,
    pub raw_before: Option<f64>,
    pub raw_after: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDataset {
    pub module_id: ModuleId,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub best_path: Option<BestPathRecord>,
    pub metadata: Option<ModuleMetadata>,
}

impl ModuleDataset {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_scores(&self) -> bool {
        self.nodes.iter().any(|n| n.scores.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_id_is_trimmed_and_length_checked() {
        assert_eq!(ModuleId::parse("  M00001 ").unwrap().as_str(), "M00001");
        assert!(matches!(
            ModuleId::parse("M0001"),
            Err(Error::InvalidModuleId { .. })
        ));
        assert!(ModuleId::parse("M000011").is_err());
        assert!(ModuleId::parse("").is_err());
    }

    #[test]
    fn display_label_strips_suffix() {
        assert_eq!(GraphNode::new("K00844_2").display_label(), "K00844");
        assert_eq!(GraphNode::new("K00844").display_label(), "K00844");
        assert_eq!(display_label("_x"), "_x");
        assert_eq!(display_label("_"), "_");
    }

    #[test]
    fn sentinels_match_case_insensitively_on_label() {
        assert!(is_sentinel_id("start"));
        assert!(is_sentinel_id("End"));
        assert!(is_sentinel_id("end_1"));
        assert!(!is_sentinel_id("K00001"));
        assert!(!is_sentinel_id("starts"));
    }
}
