//! Source record shapes and their normalization into the model.
//!
//! All defaulting happens here, once: missing radius, half-present score pairs, out-of-range
//! scores and bad edge occurrences are resolved before any layout or encoding runs.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{
    BestPathRecord, DEFAULT_NODE_RADIUS, GraphEdge, GraphNode, ModuleDataset, ModuleId,
    ModuleMetadata, Scores, is_sentinel_id,
};

/// One node record as found in node sources.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "KO_Occurrence", default)]
    pub occurrence: Option<f64>,
    #[serde(rename = "node-radius", default)]
    pub radius: Option<f64>,
    #[serde(rename = "Dk_before", default)]
    pub score_before: Option<f64>,
    #[serde(rename = "Dk_after", default)]
    pub score_after: Option<f64>,
    #[serde(rename = "E-value", default)]
    pub significance: Option<f64>,
    #[serde(default)]
    pub group: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBestPath {
    #[serde(rename = "path_str")]
    pub path_label: String,
    #[serde(rename = "geo_before", default)]
    pub aggregate_before: Option<f64>,
    #[serde(rename = "geo_after", default)]
    pub aggregate_after: Option<f64>,
    #[serde(default)]
    pub path_id: Option<i64>,
    #[serde(default)]
    pub raw_before: Option<f64>,
    #[serde(default)]
    pub raw_after: Option<f64>,
}

/// A module's entry in a node source: either a bare node array or the enriched
/// `{ nodes, best_path }` object. `best_path` stays raw so a malformed record cannot reject the
/// nodes next to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeEntry {
    Bare(Vec<RawNode>),
    Wrapped {
        nodes: Vec<RawNode>,
        #[serde(default)]
        best_path: Option<Value>,
    },
}

impl NodeEntry {
    pub fn into_parts(self) -> (Vec<RawNode>, Option<Value>) {
        match self {
            NodeEntry::Bare(nodes) => (nodes, None),
            NodeEntry::Wrapped { nodes, best_path } => (nodes, best_path),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "edge_occurence", alias = "edge_occurrence", default)]
    pub occurrence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAdjacency {
    #[serde(default)]
    pub links: Vec<RawEdge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|v| v.is_finite())
}

pub fn normalize_node(raw: RawNode) -> GraphNode {
    let occurrence = finite(raw.occurrence).filter(|v| *v >= 0.0);
    if raw.occurrence.is_some() && occurrence.is_none() {
        tracing::warn!(id = %raw.id, value = ?raw.occurrence, "ignoring invalid node occurrence");
    }

    let scores = match (finite(raw.score_before), finite(raw.score_after)) {
        (Some(before), Some(after)) => Some(Scores {
            before: before.clamp(0.0, 1.0),
            after: after.clamp(0.0, 1.0),
        }),
        (None, None) => None,
        (before, after) => {
            tracing::warn!(
                id = %raw.id,
                ?before,
                ?after,
                "node carries only one of the two scores; treating both as missing"
            );
            None
        }
    };

    let explicit = finite(raw.radius).filter(|r| *r > 0.0);
    let is_sentinel = is_sentinel_id(&raw.id);

    GraphNode {
        id: raw.id,
        occurrence,
        scores,
        significance: raw.significance,
        radius: explicit.unwrap_or(DEFAULT_NODE_RADIUS),
        radius_explicit: explicit.is_some(),
        is_sentinel,
        group: raw.group,
    }
}

pub fn normalize_edge(raw: RawEdge) -> GraphEdge {
    let occurrence = finite(raw.occurrence).filter(|v| *v >= 0.0).unwrap_or(0.0);
    GraphEdge {
        source: raw.source,
        target: raw.target,
        occurrence,
    }
}

/// `None` when the record does not have the expected shape; the module still loads without it.
pub fn normalize_best_path(module_id: &ModuleId, value: Value) -> Option<BestPathRecord> {
    let raw = match RawBestPath::deserialize(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(module = %module_id, error = %e, "ignoring malformed best path record");
            return None;
        }
    };
    Some(BestPathRecord {
        path_label: raw.path_label,
        aggregate_before: finite(raw.aggregate_before),
        aggregate_after: finite(raw.aggregate_after),
        path_id: raw.path_id,
        raw_before: finite(raw.raw_before),
        raw_after: finite(raw.raw_after),
    })
}

/// Assembles a dataset from already-parsed source records.
pub fn build_dataset(
    module_id: ModuleId,
    entry: NodeEntry,
    adjacency: RawAdjacency,
    metadata: Option<ModuleMetadata>,
) -> ModuleDataset {
    let (nodes, best_path) = entry.into_parts();
    let best_path = best_path.and_then(|value| normalize_best_path(&module_id, value));
    let nodes: Vec<GraphNode> = nodes.into_iter().map(normalize_node).collect();
    let edges: Vec<GraphEdge> = adjacency.links.into_iter().map(normalize_edge).collect();
    tracing::debug!(
        module = %module_id,
        nodes = nodes.len(),
        edges = edges.len(),
        "ingested module dataset"
    );
    ModuleDataset {
        module_id,
        nodes,
        edges,
        best_path,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawNode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn default_radius_applies_when_absent() {
        let n = normalize_node(raw(r#"{"id": "K00001"}"#));
        assert_eq!(n.radius, 10.0);
        assert!(!n.radius_explicit);

        let n = normalize_node(raw(r#"{"id": "K00001", "node-radius": 7}"#));
        assert_eq!(n.radius, 7.0);
        assert!(n.radius_explicit);
    }

    #[test]
    fn half_present_scores_become_none() {
        let n = normalize_node(raw(r#"{"id": "K1", "Dk_before": 0.3}"#));
        assert_eq!(n.scores, None);
    }

    #[test]
    fn scores_are_clamped() {
        let n = normalize_node(raw(r#"{"id": "K1", "Dk_before": -0.5, "Dk_after": 1.5}"#));
        assert_eq!(
            n.scores,
            Some(Scores {
                before: 0.0,
                after: 1.0
            })
        );
    }

    #[test]
    fn bad_edge_occurrence_becomes_zero() {
        let e: RawEdge =
            serde_json::from_str(r#"{"source": "a", "target": "b", "edge_occurence": -3}"#)
                .unwrap();
        assert_eq!(normalize_edge(e).occurrence, 0.0);
        let e: RawEdge = serde_json::from_str(r#"{"source": "a", "target": "b"}"#).unwrap();
        assert_eq!(normalize_edge(e).occurrence, 0.0);
    }

    #[test]
    fn node_entry_accepts_both_shapes() {
        let bare: NodeEntry = serde_json::from_str(r#"[{"id": "a"}]"#).unwrap();
        let (nodes, best) = bare.into_parts();
        assert_eq!(nodes.len(), 1);
        assert!(best.is_none());

        let wrapped: NodeEntry = serde_json::from_str(
            r#"{"nodes": [{"id": "a"}], "best_path": {"path_str": "a -> b", "geo_before": 0.5, "geo_after": 0.75}}"#,
        )
        .unwrap();
        let (nodes, best) = wrapped.into_parts();
        assert_eq!(nodes.len(), 1);
        assert_eq!(best.unwrap()["path_str"], "a -> b");
    }

    #[test]
    fn best_path_without_label_is_dropped() {
        let id = ModuleId::parse("M00001").unwrap();
        let value = serde_json::json!({"geo_before": 0.5, "geo_after": 0.7});
        assert_eq!(normalize_best_path(&id, value), None);

        let value = serde_json::json!({"path_str": "a -> b", "geo_before": "high"});
        assert_eq!(normalize_best_path(&id, value), None);
    }

    #[test]
    fn node_entry_rejects_other_shapes() {
        assert!(serde_json::from_str::<NodeEntry>(r#"{"nodes": 3}"#).is_err());
        assert!(serde_json::from_str::<NodeEntry>(r#""M00001""#).is_err());
    }
}
