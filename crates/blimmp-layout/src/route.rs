//! Edge routing.
//!
//! Every input edge gets exactly one route, in input order. Routes start at the source center,
//! pass through the dummy nodes created for long edges and end at the target center; edges that
//! were reversed to break a cycle are flipped back so they still read source to target.

use crate::{EdgeSlot, EdgeSpec, LayoutConfig, LayoutGraph, PLACEHOLDER_ROUTE_LEN, Point, RoutedEdge};

pub(crate) fn route_edges(
    g: &LayoutGraph,
    edges: &[EdgeSpec],
    slots: &[EdgeSlot],
    chains: &[Vec<usize>],
    config: &LayoutConfig,
) -> Vec<RoutedEdge> {
    edges
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (spec, slot))| {
            let (points, reversed, placeholder) = match *slot {
                EdgeSlot::Dangling => (placeholder_route(), false, true),
                EdgeSlot::SelfLoop(v) => (self_loop_route(g, v, config), false, false),
                EdgeSlot::Graph(e) => {
                    let reversed = g.edge(e).label.reversed;
                    (chain_route(g, &chains[e], reversed), reversed, false)
                }
            };
            RoutedEdge {
                index,
                source: spec.source.clone(),
                target: spec.target.clone(),
                points,
                reversed,
                placeholder,
            }
        })
        .collect()
}

fn center(g: &LayoutGraph, v: usize) -> Point {
    let n = g.node(v);
    Point::new(n.x, n.y)
}

fn chain_route(g: &LayoutGraph, chain: &[usize], reversed: bool) -> Vec<Point> {
    let mut points: Vec<Point> = chain.iter().map(|&v| center(g, v)).collect();
    if reversed {
        points.reverse();
    }
    points
}

/// A loop hanging off the right side of the node, returning to its center.
fn self_loop_route(g: &LayoutGraph, v: usize, config: &LayoutConfig) -> Vec<Point> {
    let n = g.node(v);
    let c = center(g, v);
    let outer = n.x + n.width / 2.0 + config.self_loop_size;
    let spread = (n.height / 4.0).max(config.self_loop_size / 2.0);
    vec![
        c,
        Point::new(outer, n.y - spread),
        Point::new(outer, n.y + spread),
        c,
    ]
}

fn placeholder_route() -> Vec<Point> {
    vec![Point::ORIGIN, Point::new(0.0, PLACEHOLDER_ROUTE_LEN)]
}
