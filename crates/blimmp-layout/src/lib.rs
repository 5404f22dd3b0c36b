#![forbid(unsafe_code)]

//! Layered graph layout for pathway module graphs.
//!
//! The pipeline follows the classic Sugiyama phases, in the same order Dagre runs them:
//! cycle breaking ([`acyclic`]), longest-path ranking ([`rank`]), long-edge normalization with
//! dummy nodes ([`normalize`]), barycenter crossing reduction ([`order`]), coordinate assignment
//! ([`position`]) and edge routing ([`route`]).
//!
//! The engine knows nothing about the biological model: callers hand it plain [`NodeSpec`] and
//! [`EdgeSpec`] slices and get back positions, multi-point routes, the layout extent, and a list of
//! [`LayoutDiagnostic`]s for input it had to work around.

pub mod acyclic;
pub mod graph;
pub mod normalize;
pub mod order;
pub mod position;
pub mod rank;
pub mod route;

use serde::{Deserialize, Serialize};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of the stand-in route emitted for edges whose endpoints are missing.
pub const PLACEHOLDER_ROUTE_LEN: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    LR,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub rankdir: RankDir,
    /// Gap between neighbouring real nodes within a layer.
    pub nodesep: f64,
    /// Gap between consecutive layers.
    pub ranksep: f64,
    /// Gap reserved around dummy (edge pass-through) nodes.
    pub edgesep: f64,
    /// Horizontal extent of the loop drawn for self edges.
    pub self_loop_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            nodesep: 20.0,
            ranksep: 50.0,
            edgesep: 10.0,
            self_loop_size: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
}

impl EdgeSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    };

    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub layer: usize,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedEdge {
    /// Position of the edge in the input slice.
    pub index: usize,
    pub source: String,
    pub target: String,
    /// Route from source to target, including both endpoint centers.
    pub points: Vec<Point>,
    /// The edge was reversed to break a cycle while ranking. `points` still run source to target.
    pub reversed: bool,
    /// The edge referenced a missing node and carries a stand-in route near the origin.
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutDiagnostic {
    DanglingEdge {
        index: usize,
        source: String,
        target: String,
        missing: Vec<String>,
    },
    DuplicateNode {
        id: String,
    },
    CycleEdgeReversed {
        index: usize,
        source: String,
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Nodes in input order (duplicates dropped).
    pub nodes: Vec<PositionedNode>,
    /// Edges in input order, one per input edge.
    pub edges: Vec<RoutedEdge>,
    pub extent: Bounds,
    pub diagnostics: Vec<LayoutDiagnostic>,
}

impl LayoutResult {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn layer_count(&self) -> usize {
        self.nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NodeLabel {
    pub width: f64,
    pub height: f64,
    pub rank: usize,
    pub order: usize,
    pub x: f64,
    pub y: f64,
    pub dummy: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeLabel {
    /// Index of the input edge this (possibly split) edge belongs to.
    pub input: usize,
    pub reversed: bool,
}

pub(crate) type LayoutGraph = graph::Graph<NodeLabel, EdgeLabel>;

/// How each input edge entered the layout graph.
#[derive(Debug, Clone, Copy)]
pub(crate) enum EdgeSlot {
    Dangling,
    SelfLoop(usize),
    Graph(usize),
}

/// Lays out `nodes` and `edges`.
///
/// Never fails: dangling edges, duplicate node ids and cycles are recorded as diagnostics.
pub fn layout(nodes: &[NodeSpec], edges: &[EdgeSpec], config: &LayoutConfig) -> LayoutResult {
    let mut diagnostics: Vec<LayoutDiagnostic> = Vec::new();
    let swap_axes = config.rankdir == RankDir::LR;

    let mut g = LayoutGraph::new();
    for spec in nodes {
        if g.has_node(&spec.id) {
            tracing::warn!(id = %spec.id, "duplicate node id; keeping the first occurrence");
            diagnostics.push(LayoutDiagnostic::DuplicateNode {
                id: spec.id.clone(),
            });
            continue;
        }
        let (width, height) = sanitize_size(spec.width, spec.height);
        let (width, height) = if swap_axes {
            (height, width)
        } else {
            (width, height)
        };
        g.set_node(
            spec.id.clone(),
            NodeLabel {
                width,
                height,
                ..Default::default()
            },
        );
    }
    let real_node_count = g.node_count();

    let mut slots: Vec<EdgeSlot> = Vec::with_capacity(edges.len());
    for (index, spec) in edges.iter().enumerate() {
        let v = g.index_of(&spec.source);
        let w = g.index_of(&spec.target);
        let slot = match (v, w) {
            (Some(v), Some(w)) if v == w => EdgeSlot::SelfLoop(v),
            (Some(v), Some(w)) => EdgeSlot::Graph(g.add_edge(
                v,
                w,
                EdgeLabel {
                    input: index,
                    reversed: false,
                },
            )),
            _ => {
                let missing: Vec<String> = [&spec.source, &spec.target]
                    .into_iter()
                    .filter(|id| !g.has_node(id))
                    .cloned()
                    .collect();
                tracing::warn!(
                    index,
                    source = %spec.source,
                    target = %spec.target,
                    ?missing,
                    "edge references a node that is not in the node set; using placeholder route"
                );
                diagnostics.push(LayoutDiagnostic::DanglingEdge {
                    index,
                    source: spec.source.clone(),
                    target: spec.target.clone(),
                    missing,
                });
                EdgeSlot::Dangling
            }
        };
        slots.push(slot);
    }

    for e in acyclic::run(&mut g) {
        let index = g.edge(e).label.input;
        tracing::debug!(index, "reversed edge to break a cycle");
        diagnostics.push(LayoutDiagnostic::CycleEdgeReversed {
            index,
            source: edges[index].source.clone(),
            target: edges[index].target.clone(),
        });
    }

    rank::longest_path(&mut g);
    let chains = normalize::run(&mut g);
    let layering = order::order(&mut g);
    position::position(&mut g, &layering, config);

    if swap_axes {
        for v in g.node_indices() {
            let n = g.node_mut(v);
            (n.x, n.y) = (n.y, n.x);
            (n.width, n.height) = (n.height, n.width);
        }
    }

    let positioned: Vec<PositionedNode> = (0..real_node_count)
        .map(|v| {
            let n = g.node(v);
            PositionedNode {
                id: g.id(v).to_string(),
                x: n.x,
                y: n.y,
                width: n.width,
                height: n.height,
                layer: n.rank,
                order: n.order,
            }
        })
        .collect();

    let routed = route::route_edges(&g, edges, &slots, &chains, config);
    let extent = compute_extent(&positioned, &routed);

    LayoutResult {
        nodes: positioned,
        edges: routed,
        extent,
        diagnostics,
    }
}

fn sanitize_size(width: f64, height: f64) -> (f64, f64) {
    let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    (clean(width), clean(height))
}

fn compute_extent(nodes: &[PositionedNode], edges: &[RoutedEdge]) -> Bounds {
    let corners = nodes.iter().flat_map(|n| {
        let hw = n.width / 2.0;
        let hh = n.height / 2.0;
        [(n.x - hw, n.y - hh), (n.x + hw, n.y + hh)]
    });
    let route_points = edges
        .iter()
        .flat_map(|e| e.points.iter().map(|p| (p.x, p.y)));
    Bounds::from_points(corners.chain(route_points)).unwrap_or(Bounds::EMPTY)
}
