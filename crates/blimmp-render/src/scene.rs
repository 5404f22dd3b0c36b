//! Backend-neutral drawing description.
//!
//! A [`Scene`] holds everything a backend needs, already in view space and in paint order:
//! edges, then nodes, then the legend panel, then the best-path summary. It also keeps the raw
//! attribute values so hover inspection can work from the scene alone.

use blimmp_core::{ModuleDataset, Scores};
use blimmp_layout::{LayoutDiagnostic, Point};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::RenderConfig;
use crate::curve::{curve_basis_path_d, trim_end};
use crate::encode::{EncodingScales, NodeFill, ScoreView};
use crate::legend::{LegendPanel, build_legends};
use crate::pipeline::LaidOutDataset;
use crate::scale::{ViewTransform, Viewport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub fill: NodeFill,
    /// Label baseline relative to the node center.
    pub label_dy: f64,
    pub occurrence: Option<f64>,
    pub scores: Option<Scores>,
    pub significance: Option<f64>,
}

impl SceneNode {
    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            format!("KO: {}", self.id),
            format!(
                "Dk_before: {}",
                fmt_value(self.scores.map(|s| s.before))
            ),
            format!("Dk_after: {}", fmt_value(self.scores.map(|s| s.after))),
            format!("E-value: {}", fmt_value(self.significance)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub index: usize,
    pub source: String,
    pub target: String,
    /// View-space route, source center to target center.
    pub route: Vec<Point>,
    /// Curve through the route, trimmed at the target outline.
    pub path: String,
    pub color: Rgb,
    pub width: f64,
    pub occurrence: f64,
    pub placeholder: bool,
}

impl SceneEdge {
    pub fn tooltip_lines(&self) -> Vec<String> {
        vec![
            format!("{} \u{2192} {}", self.source, self.target),
            format!("Occurrence: {}", fmt_value(Some(self.occurrence))),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub x: f64,
    pub y: f64,
    pub row_height: f64,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub module_id: String,
    pub caption: String,
    pub width: f64,
    pub height: f64,
    pub score_view: ScoreView,
    pub arrow_size: f64,
    pub label_font_size: f64,
    pub stroke_color: Rgb,
    pub edges: Vec<SceneEdge>,
    pub nodes: Vec<SceneNode>,
    pub legend: LegendPanel,
    pub summary: Option<SummaryTable>,
    pub diagnostics: Vec<LayoutDiagnostic>,
}

impl Scene {
    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

const SUMMARY_ROW_HEIGHT: f64 = 16.0;

pub fn build_scene(
    laid: &LaidOutDataset,
    transform: &ViewTransform,
    scales: &EncodingScales,
    view: ScoreView,
    viewport: Viewport,
    config: &RenderConfig,
) -> Scene {
    let dataset = &laid.dataset;
    let layout = &laid.layout;

    let mut by_id: FxHashMap<&str, usize> = FxHashMap::default();
    for (i, n) in dataset.nodes.iter().enumerate() {
        by_id.entry(n.id.as_str()).or_insert(i);
    }

    let nodes: Vec<SceneNode> = layout
        .nodes
        .iter()
        .filter_map(|p| {
            let node = &dataset.nodes[*by_id.get(p.id.as_str())?];
            let enc = scales.node(node, view);
            let center = transform.apply(Point::new(p.x, p.y));
            let label_dy = if config.label_offset < 0.0 {
                -enc.radius + config.label_offset
            } else {
                enc.radius + config.label_offset
            };
            Some(SceneNode {
                id: node.id.clone(),
                label: node.display_label().to_string(),
                x: center.x,
                y: center.y,
                radius: enc.radius,
                fill: enc.fill,
                label_dy,
                occurrence: node.occurrence,
                scores: node.scores,
                significance: node.significance,
            })
        })
        .collect();

    let radius_of: FxHashMap<&str, f64> = nodes.iter().map(|n| (n.id.as_str(), n.radius)).collect();

    let edges: Vec<SceneEdge> = layout
        .edges
        .iter()
        .zip(&dataset.edges)
        .map(|(routed, edge)| {
            let enc = scales.edge(edge);
            let route: Vec<Point> = routed.points.iter().map(|p| transform.apply(*p)).collect();
            let trim = if routed.placeholder {
                0.0
            } else {
                radius_of.get(edge.target.as_str()).copied().unwrap_or(0.0)
            };
            SceneEdge {
                index: routed.index,
                source: edge.source.clone(),
                target: edge.target.clone(),
                path: curve_basis_path_d(&trim_end(&route, trim)),
                route,
                color: enc.color,
                width: enc.width,
                occurrence: edge.occurrence,
                placeholder: routed.placeholder,
            }
        })
        .collect();

    let legend = build_legends(dataset, scales, view, viewport, config);
    let summary = summary_table(dataset, legend.x, legend.bottom);

    Scene {
        module_id: dataset.module_id.to_string(),
        caption: caption(dataset),
        width: viewport.width,
        height: viewport.height,
        score_view: view,
        arrow_size: config.arrow_size,
        label_font_size: config.label_font_size,
        stroke_color: config.stroke_color,
        edges,
        nodes,
        legend,
        summary,
        diagnostics: layout.diagnostics.clone(),
    }
}

fn caption(dataset: &ModuleDataset) -> String {
    match dataset.metadata.as_ref().and_then(|m| m.description.as_deref()) {
        Some(desc) => format!("{}: {}", dataset.module_id, desc),
        None => dataset.module_id.to_string(),
    }
}

fn summary_table(dataset: &ModuleDataset, x: f64, y: f64) -> Option<SummaryTable> {
    let best = dataset.best_path.as_ref()?;
    let mut rows = vec![SummaryRow {
        label: "Module".to_string(),
        value: dataset.module_id.to_string(),
    }];
    if let Some(meta) = &dataset.metadata {
        rows.push(SummaryRow {
            label: "Category".to_string(),
            value: meta.category.clone(),
        });
    }
    rows.push(SummaryRow {
        label: "Best path".to_string(),
        value: best.path_label.clone(),
    });
    rows.push(SummaryRow {
        label: "Before".to_string(),
        value: fmt_aggregate(best.aggregate_before),
    });
    rows.push(SummaryRow {
        label: "After".to_string(),
        value: fmt_aggregate(best.aggregate_after),
    });
    Some(SummaryTable {
        x,
        y,
        row_height: SUMMARY_ROW_HEIGHT,
        rows,
    })
}

fn fmt_aggregate(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.4}"),
        None => "n/a".to_string(),
    }
}

/// Raw attribute values as shown in tooltips: scientific notation for very small or very large
/// magnitudes, plain decimals otherwise.
pub fn fmt_value(v: Option<f64>) -> String {
    match v {
        None => "n/a".to_string(),
        Some(v) if v != 0.0 && v.is_finite() && (v.abs() < 1e-4 || v.abs() >= 1e21) => {
            format!("{v:e}")
        }
        Some(v) => format!("{v}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_formatting() {
        assert_eq!(fmt_value(Some(1e-30)), "1e-30");
        assert_eq!(fmt_value(Some(0.2)), "0.2");
        assert_eq!(fmt_value(Some(12.0)), "12");
        assert_eq!(fmt_value(None), "n/a");
        assert_eq!(fmt_aggregate(Some(0.76923)), "0.7692");
    }
}
