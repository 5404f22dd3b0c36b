#![forbid(unsafe_code)]

//! Pathway module graph model and its sources.
//!
//! - [`model`]: the normalized dataset handed to layout and rendering
//! - [`ingest`]: source record shapes and all defaulting rules
//! - [`source`]: node / adjacency / metadata sources and module resolution
//! - [`store`]: the persisted override upload and threshold
//! - [`sanitize`]: `NaN` / `Infinity` cleanup for uploaded JSON

pub mod error;
pub mod ingest;
pub mod model;
pub mod sanitize;
pub mod source;
pub mod store;

pub use error::{Error, Result, SourceKind};
pub use model::{
    BestPathRecord, DEFAULT_NODE_RADIUS, GraphEdge, GraphNode, ModuleDataset, ModuleId,
    ModuleMetadata, Scores,
};
pub use source::{AdjacencySource, MetadataSource, NodeSource, SourceSet};
pub use store::StateStore;
