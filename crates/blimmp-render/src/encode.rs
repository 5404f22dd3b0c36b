//! Attribute domains to visual channels.
//!
//! Scales are derived once per render from the dataset ([`EncodingScales::from_dataset`]); the
//! per-node and per-edge encodings are pure functions of those scales, the node or edge, and the
//! selected [`ScoreView`].

use blimmp_core::{GraphEdge, GraphNode, ModuleDataset, Scores};
use serde::{Deserialize, Serialize};

use crate::color::{Ramp, Rgb, Scheme, interpolate_rgb};
use crate::config::RenderConfig;
use crate::scale::{LinearScale, SequentialScale};

/// Which of the two scores drives the upper half of split nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreView {
    #[default]
    Before,
    After,
}

impl ScoreView {
    pub fn toggled(self) -> Self {
        match self {
            ScoreView::Before => ScoreView::After,
            ScoreView::After => ScoreView::Before,
        }
    }

    pub fn pick(self, scores: &Scores) -> f64 {
        match self {
            ScoreView::Before => scores.before,
            ScoreView::After => scores.after,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreView::Before => "before",
            ScoreView::After => "after",
        }
    }
}

impl std::str::FromStr for ScoreView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(ScoreView::Before),
            "after" => Ok(ScoreView::After),
            other => Err(format!("unknown score view {other:?} (expected before|after)")),
        }
    }
}

pub const SCORE_SCHEME: Scheme = Scheme::Reds;
pub const NODE_OCCURRENCE_RAMP: Ramp = Ramp::new(Scheme::Greys, 0.3, 0.8);
pub const EDGE_OCCURRENCE_RAMP: Ramp = Ramp::new(Scheme::Greys, 0.5, 0.8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingScales {
    /// Node occurrence to radius. `None` when no node carries an occurrence.
    pub radius: Option<LinearScale>,
    /// Node occurrence to the fallback grey ramp.
    pub node_occurrence: Option<SequentialScale>,
    pub edge_occurrence: Option<SequentialScale>,
    pub edge_width: Option<LinearScale>,
    /// `log10(E-value)` to the significance gradient.
    pub significance: SequentialScale,
    pub significance_colors: [Rgb; 2],
    pub neutral_color: Rgb,
    pub sentinel_color: Rgb,
}

impl EncodingScales {
    pub fn from_dataset(dataset: &ModuleDataset, config: &RenderConfig) -> Self {
        let node_occ = || dataset.nodes.iter().filter_map(|n| n.occurrence);
        let edge_occ = || dataset.edges.iter().map(|e| e.occurrence);
        Self {
            radius: LinearScale::from_extent(node_occ(), config.radius_range),
            node_occurrence: SequentialScale::from_extent(node_occ()),
            edge_occurrence: SequentialScale::from_extent(edge_occ()),
            edge_width: LinearScale::from_extent(edge_occ(), config.edge_width_range),
            significance: SequentialScale::new(config.significance_domain).clamped(),
            significance_colors: config.significance_colors,
            neutral_color: config.neutral_color,
            sentinel_color: config.sentinel_color,
        }
    }

    pub fn radius(&self, node: &GraphNode) -> f64 {
        if node.radius_explicit {
            return node.radius;
        }
        match (node.occurrence, &self.radius) {
            (Some(occ), Some(scale)) => scale.apply(occ),
            _ => node.radius,
        }
    }

    pub fn score_color(&self, score: f64) -> Rgb {
        SCORE_SCHEME.interpolate(score)
    }

    /// Color for a raw E-value; neutral when its logarithm is not finite.
    pub fn significance_color(&self, significance: Option<f64>) -> Rgb {
        let log = significance.map(f64::log10).unwrap_or(f64::NAN);
        if !log.is_finite() {
            return self.neutral_color;
        }
        self.significance_color_for_log(log)
    }

    pub fn significance_color_for_log(&self, log: f64) -> Rgb {
        let [from, to] = self.significance_colors;
        interpolate_rgb(from, to, self.significance.t(log))
    }

    pub fn occurrence_color(&self, occurrence: Option<f64>) -> Rgb {
        let t = match (occurrence, &self.node_occurrence) {
            (Some(occ), Some(scale)) => scale.t(occ),
            _ => 0.0,
        };
        NODE_OCCURRENCE_RAMP.at(t)
    }

    pub fn edge(&self, edge: &GraphEdge) -> EdgeEncoding {
        let t = self
            .edge_occurrence
            .map(|s| s.t(edge.occurrence))
            .unwrap_or(0.0);
        let width = self
            .edge_width
            .map(|s| s.apply(edge.occurrence))
            .unwrap_or(1.0);
        EdgeEncoding {
            color: EDGE_OCCURRENCE_RAMP.at(t),
            width,
        }
    }

    pub fn node(&self, node: &GraphNode, view: ScoreView) -> NodeEncoding {
        let fill = if node.is_sentinel {
            NodeFill::Sentinel {
                color: self.sentinel_color,
            }
        } else if let Some(scores) = &node.scores {
            NodeFill::Split {
                score: self.score_color(view.pick(scores)),
                significance: self.significance_color(node.significance),
            }
        } else {
            NodeFill::Fallback {
                color: self.occurrence_color(node.occurrence),
            }
        };
        NodeEncoding {
            radius: self.radius(node),
            fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeFill {
    Sentinel { color: Rgb },
    Fallback { color: Rgb },
    /// Upper half: selected score. Lower half: significance.
    Split { score: Rgb, significance: Rgb },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeEncoding {
    pub radius: f64,
    pub fill: NodeFill,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeEncoding {
    pub color: Rgb,
    pub width: f64,
}
