//! Coordinate assignment.
//!
//! Works in a top-to-bottom frame (the caller swaps axes for `RankDir::LR`). The primary axis is
//! fixed per layer: each layer is as tall as its tallest node and layers are `ranksep` apart. On
//! the secondary axis nodes are first packed left to right with the configured separations and
//! centered on the widest layer, then nudged toward the mean position of their neighbours in a
//! few alternating passes. Each nudge keeps the order and minimum separations intact by averaging
//! a left-packed and a right-packed placement.

use crate::{LayoutConfig, LayoutGraph};

pub const REFINE_PASSES: usize = 8;

pub(crate) fn position(g: &mut LayoutGraph, layering: &[Vec<usize>], config: &LayoutConfig) {
    assign_y(g, layering, config);
    assign_initial_x(g, layering, config);
    for pass in 0..REFINE_PASSES {
        let downward = pass % 2 == 0;
        if downward {
            for r in 1..layering.len() {
                align_layer(g, &layering[r], true, config);
            }
        } else {
            for r in (0..layering.len().saturating_sub(1)).rev() {
                align_layer(g, &layering[r], false, config);
            }
        }
    }
    translate_to_origin(g);
}

fn assign_y(g: &mut LayoutGraph, layering: &[Vec<usize>], config: &LayoutConfig) {
    let mut y = 0.0;
    for layer in layering {
        let height = layer
            .iter()
            .map(|&v| g.node(v).height)
            .fold(0.0_f64, f64::max);
        for &v in layer {
            g.node_mut(v).y = y + height / 2.0;
        }
        y += height + config.ranksep;
    }
}

fn half_sep(g: &LayoutGraph, v: usize, config: &LayoutConfig) -> f64 {
    if g.node(v).dummy {
        config.edgesep / 2.0
    } else {
        config.nodesep / 2.0
    }
}

/// Minimum center-to-center distance between two neighbours in a layer.
fn min_gap(g: &LayoutGraph, left: usize, right: usize, config: &LayoutConfig) -> f64 {
    g.node(left).width / 2.0
        + half_sep(g, left, config)
        + half_sep(g, right, config)
        + g.node(right).width / 2.0
}

fn assign_initial_x(g: &mut LayoutGraph, layering: &[Vec<usize>], config: &LayoutConfig) {
    let mut widths: Vec<f64> = Vec::with_capacity(layering.len());
    for layer in layering {
        let mut x = 0.0;
        let mut prev: Option<usize> = None;
        for &v in layer {
            x = match prev {
                Some(p) => x + min_gap(g, p, v, config),
                None => g.node(v).width / 2.0,
            };
            g.node_mut(v).x = x;
            prev = Some(v);
        }
        let width = prev.map(|p| x + g.node(p).width / 2.0).unwrap_or(0.0);
        widths.push(width);
    }

    let widest = widths.iter().copied().fold(0.0_f64, f64::max);
    for (layer, width) in layering.iter().zip(widths) {
        let shift = (widest - width) / 2.0;
        for &v in layer {
            g.node_mut(v).x += shift;
        }
    }
}

fn align_layer(g: &mut LayoutGraph, layer: &[usize], use_predecessors: bool, config: &LayoutConfig) {
    if layer.is_empty() {
        return;
    }

    let desired: Vec<f64> = layer
        .iter()
        .map(|&v| {
            let xs: Vec<f64> = if use_predecessors {
                g.predecessors(v).map(|u| g.node(u).x).collect()
            } else {
                g.successors(v).map(|u| g.node(u).x).collect()
            };
            if xs.is_empty() {
                g.node(v).x
            } else {
                xs.iter().sum::<f64>() / xs.len() as f64
            }
        })
        .collect();
    let gaps: Vec<f64> = layer
        .windows(2)
        .map(|pair| min_gap(g, pair[0], pair[1], config))
        .collect();

    let n = layer.len();
    let mut left_packed = desired.clone();
    for i in 1..n {
        left_packed[i] = left_packed[i].max(left_packed[i - 1] + gaps[i - 1]);
    }
    let mut right_packed = desired;
    for i in (0..n - 1).rev() {
        right_packed[i] = right_packed[i].min(right_packed[i + 1] - gaps[i]);
    }

    for (i, &v) in layer.iter().enumerate() {
        g.node_mut(v).x = (left_packed[i] + right_packed[i]) / 2.0;
    }
}

fn translate_to_origin(g: &mut LayoutGraph) {
    let min_x = g
        .node_indices()
        .map(|v| g.node(v).x - g.node(v).width / 2.0)
        .fold(f64::INFINITY, f64::min);
    if !min_x.is_finite() {
        return;
    }
    for v in g.node_indices() {
        g.node_mut(v).x -= min_x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeLabel, NodeLabel};

    #[test]
    fn neighbours_in_a_layer_respect_nodesep() {
        let mut g = LayoutGraph::new();
        for id in ["a", "b", "c"] {
            g.set_node(
                id,
                NodeLabel {
                    width: 40.0,
                    height: 40.0,
                    ..Default::default()
                },
            );
        }
        let config = LayoutConfig::default();
        position(&mut g, &[vec![0, 1, 2]], &config);

        let xs: Vec<f64> = g.node_indices().map(|v| g.node(v).x).collect();
        assert_eq!(xs, vec![20.0, 80.0, 140.0]);
        for v in g.node_indices() {
            assert_eq!(g.node(v).y, 20.0);
        }
    }

    #[test]
    fn single_child_is_centered_under_parent() {
        let mut g = LayoutGraph::new();
        for (id, rank) in [("a", 0), ("b", 0), ("c", 1)] {
            g.set_node(
                id,
                NodeLabel {
                    width: 40.0,
                    height: 40.0,
                    rank,
                    ..Default::default()
                },
            );
        }
        g.add_edge(
            1,
            2,
            EdgeLabel {
                input: 0,
                reversed: false,
            },
        );
        let config = LayoutConfig::default();
        position(&mut g, &[vec![0, 1], vec![2]], &config);

        assert!((g.node(2).x - g.node(1).x).abs() < 1e-9);
        assert_eq!(g.node(2).y, 40.0 + config.ranksep + 20.0);
    }
}
