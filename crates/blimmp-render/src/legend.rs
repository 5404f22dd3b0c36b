//! Gradient legends, generated from the same scales the encoder draws with.

use blimmp_core::ModuleDataset;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::RenderConfig;
use crate::encode::{EDGE_OCCURRENCE_RAMP, EncodingScales, ScoreView};
use crate::scale::Viewport;

pub const PANEL_TITLE: &str = "Color Scales";
const TITLE_GAP: f64 = 6.0;
const HEADING_GAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendKind {
    Score,
    Significance,
    NodeOccurrence,
    EdgeOccurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendStop {
    /// 0 at the top of the bar, 1 at the bottom.
    pub offset: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendTick {
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub kind: LegendKind,
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stops: Vec<LegendStop>,
    pub ticks: Vec<LegendTick>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendPanel {
    pub x: f64,
    /// Baseline of the panel heading.
    pub y: f64,
    pub legends: Vec<Legend>,
    /// First free y below the last legend.
    pub bottom: f64,
}

/// Value range shown by one bar, top to bottom, plus how to color and label it.
struct Axis<'a> {
    kind: LegendKind,
    title: String,
    top: f64,
    bottom: f64,
    color: Box<dyn Fn(f64) -> Rgb + 'a>,
    label: fn(f64) -> String,
}

pub fn build_legends(
    dataset: &ModuleDataset,
    scales: &EncodingScales,
    view: ScoreView,
    viewport: Viewport,
    config: &RenderConfig,
) -> LegendPanel {
    let mut axes: Vec<Axis<'_>> = Vec::new();

    if dataset.has_scores() {
        axes.push(Axis {
            kind: LegendKind::Score,
            title: format!("Score ({})", view.label()),
            top: 1.0,
            bottom: 0.0,
            color: Box::new(|v: f64| scales.score_color(v)),
            label: fmt_tick,
        });
        let [lo, hi] = scales.significance.domain;
        axes.push(Axis {
            kind: LegendKind::Significance,
            title: "E-value".to_string(),
            top: lo,
            bottom: hi,
            color: Box::new(|v: f64| scales.significance_color_for_log(v)),
            label: fmt_exponent_tick,
        });
    }

    let uses_fallback = dataset
        .nodes
        .iter()
        .any(|n| !n.is_sentinel && n.scores.is_none());
    if let (true, Some(scale)) = (uses_fallback, scales.node_occurrence) {
        let [lo, hi] = scale.domain;
        axes.push(Axis {
            kind: LegendKind::NodeOccurrence,
            title: "Node occurrence".to_string(),
            top: hi,
            bottom: lo,
            color: Box::new(|v: f64| scales.occurrence_color(Some(v))),
            label: fmt_tick,
        });
    }

    if let (false, Some(scale)) = (dataset.edges.is_empty(), scales.edge_occurrence) {
        let [lo, hi] = scale.domain;
        axes.push(Axis {
            kind: LegendKind::EdgeOccurrence,
            title: "Edge occurrence".to_string(),
            top: hi,
            bottom: lo,
            color: Box::new(move |v: f64| EDGE_OCCURRENCE_RAMP.at(scale.t(v))),
            label: fmt_tick,
        });
    }

    let lc = &config.legend;
    let padding = config.padding.fit(viewport);
    let x = viewport.width - padding.right + lc.inset;
    let heading_y = padding.top;
    let mut bar_top = heading_y + HEADING_GAP;
    let mut legends = Vec::with_capacity(axes.len());

    for axis in axes {
        let stops = (0..lc.stops)
            .map(|i| {
                let offset = i as f64 / (lc.stops - 1) as f64;
                LegendStop {
                    offset,
                    color: (axis.color)(lerp(axis.top, axis.bottom, offset)),
                }
            })
            .collect();
        let ticks = (0..lc.ticks)
            .map(|i| {
                let f = i as f64 / (lc.ticks - 1) as f64;
                LegendTick {
                    y: bar_top + f * lc.bar_height,
                    label: (axis.label)(lerp(axis.top, axis.bottom, f)),
                }
            })
            .collect();
        legends.push(Legend {
            kind: axis.kind,
            title: axis.title,
            x,
            y: bar_top,
            width: lc.bar_width,
            height: lc.bar_height,
            stops,
            ticks,
        });
        bar_top += lc.bar_height + lc.spacing;
    }

    LegendPanel {
        x,
        y: heading_y,
        legends,
        bottom: bar_top,
    }
}

impl Legend {
    pub fn title_y(&self) -> f64 {
        self.y - TITLE_GAP
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Up to two decimals, trailing zeros trimmed.
pub fn fmt_tick(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn fmt_exponent_tick(v: f64) -> String {
    format!("1e{}", v.round() as i64)
}
