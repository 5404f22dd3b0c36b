#![forbid(unsafe_code)]

//! Visual encoding and scene rendering for pathway module graphs.
//!
//! The pipeline is `layout -> scale -> encode -> scene`, driven either directly through
//! [`pipeline::render_scene`] or statefully through [`interaction::Viewer`], which caches the
//! layout so score-view toggles and resizes only redo the cheap stages.

pub mod color;
pub mod config;
pub mod curve;
pub mod encode;
pub mod interaction;
pub mod legend;
pub mod pipeline;
pub mod scale;
pub mod scene;
pub mod svg;

pub use config::RenderConfig;
pub use encode::{NodeFill, ScoreView};
pub use interaction::{Completion, RequestToken, Tooltip, Viewer};
pub use pipeline::{LaidOutDataset, ViewState, layout_dataset, render_scene};
pub use scale::{Padding, Viewport};
pub use scene::Scene;
pub use svg::render_svg;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid render config: {message}")]
    InvalidConfig { message: String },
    #[error(transparent)]
    Core(#[from] blimmp_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
