//! The render pipeline as plain functions: layout, then scale, encode and scene building.

use blimmp_core::ModuleDataset;
use blimmp_layout::{EdgeSpec, LayoutResult, NodeSpec, layout};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::RenderConfig;
use crate::encode::{EncodingScales, ScoreView};
use crate::scale::{ViewTransform, Viewport};
use crate::scene::{Scene, build_scene};

/// Per-session view inputs: everything besides the dataset that a render depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub viewport: Viewport,
    pub score_view: ScoreView,
}

impl ViewState {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            score_view: ScoreView::default(),
        }
    }

    /// The default view for a requested window width.
    pub fn for_width(requested_width: f64, config: &RenderConfig) -> Self {
        Self::new(Viewport::fit_request(
            requested_width,
            config.max_width,
            config.height,
        ))
    }
}

/// A dataset together with its layout, which stays valid until the dataset is replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaidOutDataset {
    pub dataset: ModuleDataset,
    pub layout: LayoutResult,
}

pub fn layout_dataset(dataset: ModuleDataset, config: &RenderConfig) -> LaidOutDataset {
    let size = config.node_size;
    let nodes: Vec<NodeSpec> = dataset
        .nodes
        .iter()
        .map(|n| NodeSpec::new(n.id.clone(), size, size))
        .collect();
    let edges: Vec<EdgeSpec> = dataset
        .edges
        .iter()
        .map(|e| EdgeSpec::new(e.source.clone(), e.target.clone()))
        .collect();
    let layout = layout(&nodes, &edges, &config.layout);
    tracing::debug!(
        module = %dataset.module_id,
        layers = layout.layer_count(),
        diagnostics = layout.diagnostics.len(),
        "laid out module"
    );
    LaidOutDataset { dataset, layout }
}

/// Scale, encode and build the scene for an already laid-out dataset.
pub fn render_laid_out(laid: &LaidOutDataset, view: &ViewState, config: &RenderConfig) -> Scene {
    let transform = ViewTransform::fit(laid.layout.extent, view.viewport, config.padding);
    let scales = EncodingScales::from_dataset(&laid.dataset, config);
    build_scene(
        laid,
        &transform,
        &scales,
        view.score_view,
        view.viewport,
        config,
    )
}

/// The full pipeline for one dataset.
pub fn render_scene(
    dataset: &ModuleDataset,
    view: &ViewState,
    config: &RenderConfig,
) -> Result<Scene> {
    config.validate()?;
    let laid = layout_dataset(dataset.clone(), config);
    Ok(render_laid_out(&laid, view, config))
}
