//! Node, adjacency and metadata sources, and module resolution across them.
//!
//! Sources keep each module's entry as raw JSON until it is asked for, so a malformed entry only
//! fails the lookup that touches it. Maps preserve file order.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result, SourceKind};
use crate::ingest::{NodeEntry, RawAdjacency, RawMetadata, build_dataset};
use crate::model::{ModuleDataset, ModuleId, ModuleMetadata};
use crate::sanitize::sanitize_non_finite_literals;

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::SourceRead {
        path: path.to_path_buf(),
        source,
    })
}

/// `{ module_id: [node...] | { nodes: [...], best_path?: {...} } }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSource {
    modules: IndexMap<String, Value>,
}

impl NodeSource {
    /// Parses node-source text, rewriting bare `NaN` / `Infinity` literals first.
    pub fn parse(text: &str) -> Result<Self> {
        let modules = serde_json::from_str(&sanitize_non_finite_literals(text))?;
        Ok(Self { modules })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&read_text(path)?)
    }

    pub fn contains(&self, module_id: &ModuleId) -> bool {
        self.modules.contains_key(module_id.as_str())
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Looks up and parses one module's entry. `Ok(None)` when the module is absent.
    pub fn entry(&self, module_id: &ModuleId) -> Result<Option<NodeEntry>> {
        let Some(value) = self.modules.get(module_id.as_str()) else {
            return Ok(None);
        };
        NodeEntry::deserialize(value)
            .map(Some)
            .map_err(|e| Error::UnexpectedNodeShape {
                module_id: module_id.to_string(),
                message: e.to_string(),
            })
    }
}

/// `{ module_id: { links: [{ source, target, edge_occurence }] } }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencySource {
    modules: IndexMap<String, Value>,
}

impl AdjacencySource {
    pub fn parse(text: &str) -> Result<Self> {
        let modules = serde_json::from_str(&sanitize_non_finite_literals(text))?;
        Ok(Self { modules })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&read_text(path)?)
    }

    pub fn links(&self, module_id: &ModuleId) -> Result<Option<RawAdjacency>> {
        let Some(value) = self.modules.get(module_id.as_str()) else {
            return Ok(None);
        };
        RawAdjacency::deserialize(value)
            .map(Some)
            .map_err(|e| Error::UnexpectedAdjacencyShape {
                module_id: module_id.to_string(),
                message: e.to_string(),
            })
    }
}

/// `{ category: { module_id: { Description } } }`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataSource {
    categories: IndexMap<String, IndexMap<String, Value>>,
}

impl MetadataSource {
    pub fn parse(text: &str) -> Result<Self> {
        let categories = serde_json::from_str(text)?;
        Ok(Self { categories })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::parse(&read_text(path)?)
    }

    /// First category (in file order) that lists the module.
    pub fn lookup(&self, module_id: &ModuleId) -> Option<ModuleMetadata> {
        self.categories.iter().find_map(|(category, modules)| {
            let value = modules.get(module_id.as_str())?;
            let raw = RawMetadata::deserialize(value).unwrap_or_else(|e| {
                tracing::debug!(module = %module_id, error = %e, "ignoring malformed metadata entry");
                RawMetadata::default()
            });
            Some(ModuleMetadata {
                category: category.clone(),
                description: raw.description,
            })
        })
    }
}

/// The full set of sources a module lookup consults.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub nodes: NodeSource,
    pub adjacency: AdjacencySource,
    pub metadata: Option<MetadataSource>,
    /// Uploaded override; consulted before `nodes`.
    pub override_nodes: Option<NodeSource>,
}

impl SourceSet {
    pub fn new(nodes: NodeSource, adjacency: AdjacencySource) -> Self {
        Self {
            nodes,
            adjacency,
            metadata: None,
            override_nodes: None,
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataSource) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_override(mut self, override_nodes: Option<NodeSource>) -> Self {
        self.override_nodes = override_nodes;
        self
    }

    /// Module ids with node data, in file order; override-only ids follow the node source's.
    pub fn module_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.module_ids().collect();
        if let Some(o) = &self.override_nodes {
            for id in o.module_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Materializes a module: override node source first, fallback node source second, then the
    /// adjacency links and (optionally) metadata.
    pub fn resolve(&self, module_id: &ModuleId) -> Result<ModuleDataset> {
        let from_override = match &self.override_nodes {
            Some(o) => o.entry(module_id)?,
            None => None,
        };
        let entry = match from_override {
            Some(entry) => {
                tracing::debug!(module = %module_id, "using uploaded override node data");
                entry
            }
            None => self
                .nodes
                .entry(module_id)?
                .ok_or_else(|| Error::ModuleNotFound {
                    module_id: module_id.to_string(),
                    kind: SourceKind::Nodes,
                })?,
        };

        let adjacency = self
            .adjacency
            .links(module_id)?
            .ok_or_else(|| Error::ModuleNotFound {
                module_id: module_id.to_string(),
                kind: SourceKind::Adjacency,
            })?;

        let metadata = self.metadata.as_ref().and_then(|m| m.lookup(module_id));

        Ok(build_dataset(module_id.clone(), entry, adjacency, metadata))
    }
}
