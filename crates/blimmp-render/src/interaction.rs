//! Session state and the interactions that re-run parts of the pipeline.
//!
//! [`Viewer`] owns the most recently loaded dataset, its cached layout and the current scene.
//! Toggling the score view and resizing reuse the cached layout; loading a new dataset replaces
//! everything. Dataset loads are sequenced with [`RequestToken`]s so a slow, older lookup can never
//! overwrite the result of a newer one.

use blimmp_core::ModuleDataset;
use blimmp_layout::Point;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::encode::ScoreView;
use crate::pipeline::{LaidOutDataset, ViewState, layout_dataset, render_laid_out};
use crate::scale::Viewport;
use crate::scene::{Scene, SceneEdge};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    /// A newer request was issued after this one; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoverTarget {
    Node { id: String },
    Edge { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub target: HoverTarget,
    pub x: f64,
    pub y: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Viewer {
    config: RenderConfig,
    view: ViewState,
    current: Option<LaidOutDataset>,
    scene: Option<Scene>,
    tooltip: Option<Tooltip>,
    issued: u64,
}

impl Viewer {
    pub fn new(config: RenderConfig, view: ViewState) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            view,
            current: None,
            scene: None,
            tooltip: None,
            issued: 0,
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn dataset(&self) -> Option<&ModuleDataset> {
        self.current.as_ref().map(|c| &c.dataset)
    }

    pub fn laid_out(&self) -> Option<&LaidOutDataset> {
        self.current.as_ref()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Lays out and renders `dataset` immediately, replacing whatever was shown.
    pub fn show(&mut self, dataset: ModuleDataset) -> &Scene {
        let laid = layout_dataset(dataset, &self.config);
        let scene = render_laid_out(&laid, &self.view, &self.config);
        self.current = Some(laid);
        self.tooltip = None;
        self.scene.insert(scene)
    }

    /// Starts a dataset lookup. Only the most recently issued token may install its result.
    pub fn begin_request(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Finishes a lookup started with [`Viewer::begin_request`].
    ///
    /// A failed lookup (for example an unknown module) clears the drawing, so no stale or partial
    /// graph stays on screen, and the error is returned to the caller.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: blimmp_core::Result<ModuleDataset>,
    ) -> Result<Completion> {
        if !self.is_current(token) {
            tracing::debug!(
                token = token.0,
                latest = self.issued,
                "dropping stale dataset completion"
            );
            return Ok(Completion::Stale);
        }
        match outcome {
            Ok(dataset) => {
                self.show(dataset);
                Ok(Completion::Rendered)
            }
            Err(e) => {
                self.clear();
                Err(Error::Core(e))
            }
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.scene = None;
        self.tooltip = None;
    }

    fn rerender(&mut self) -> Option<&Scene> {
        let laid = self.current.as_ref()?;
        let scene = render_laid_out(laid, &self.view, &self.config);
        self.tooltip = None;
        Some(self.scene.insert(scene))
    }

    pub fn set_score_view(&mut self, score_view: ScoreView) -> Option<&Scene> {
        self.view.score_view = score_view;
        self.rerender()
    }

    pub fn toggle_score_view(&mut self) -> Option<&Scene> {
        self.set_score_view(self.view.score_view.toggled())
    }

    pub fn resize(&mut self, viewport: Viewport) -> Option<&Scene> {
        self.view.viewport = viewport;
        self.rerender()
    }

    /// Resizes to a requested window width, applying the width cap and fixed height.
    pub fn resize_to_width(&mut self, requested_width: f64) -> Option<&Scene> {
        let viewport =
            Viewport::fit_request(requested_width, self.config.max_width, self.config.height);
        self.resize(viewport)
    }

    /// Hit-tests nodes first (topmost wins), then edges, and shows the matching tooltip.
    pub fn hover(&mut self, pointer: Point) -> Option<&Tooltip> {
        let scene = self.scene.as_ref()?;
        let [dx, dy] = self.config.tooltip_offset;

        let hit = scene
            .nodes
            .iter()
            .rev()
            .find(|n| (pointer.x - n.x).hypot(pointer.y - n.y) <= n.radius)
            .map(|n| (HoverTarget::Node { id: n.id.clone() }, n.tooltip_lines()))
            .or_else(|| {
                scene
                    .edges
                    .iter()
                    .rev()
                    .find(|e| edge_hit(e, pointer, self.config.edge_hit_slop))
                    .map(|e| (HoverTarget::Edge { index: e.index }, e.tooltip_lines()))
            });

        self.tooltip = hit.map(|(target, lines)| Tooltip {
            target,
            x: pointer.x + dx,
            y: pointer.y + dy,
            lines,
        });
        self.tooltip.as_ref()
    }

    pub fn pointer_out(&mut self) {
        self.tooltip = None;
    }
}

fn edge_hit(edge: &SceneEdge, p: Point, slop: f64) -> bool {
    let tolerance = edge.width / 2.0 + slop;
    edge.route
        .windows(2)
        .any(|seg| distance_to_segment(p, seg[0], seg[1]) <= tolerance)
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (vx, vy) = (b.x - a.x, b.y - a.y);
    let len2 = vx * vx + vy * vy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * vx + (p.y - a.y) * vy) / len2).clamp(0.0, 1.0)
    };
    (p.x - (a.x + t * vx)).hypot(p.y - (a.y + t * vy))
}
