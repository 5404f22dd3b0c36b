//! Node ordering / crossing minimization.
//!
//! Layers are seeded with a depth-first traversal, then refined with alternating down/up
//! barycenter sweeps. After every sweep the number of crossings is counted and the best layering
//! seen so far is kept. The search stops after [`MAX_SWEEPS`] sweeps or once
//! [`STALE_SWEEP_LIMIT`] consecutive sweeps fail to improve.

use crate::LayoutGraph;

pub const MAX_SWEEPS: usize = 24;
pub const STALE_SWEEP_LIMIT: usize = 4;

/// Computes the within-layer order, stores it on the nodes and returns the layering.
pub(crate) fn order(g: &mut LayoutGraph) -> Vec<Vec<usize>> {
    let mut layering = init_order(g);
    assign_order(g, &layering);

    let mut best = layering.clone();
    let mut best_cc = cross_count(g, &layering);
    let mut stale = 0usize;

    for sweep in 0..MAX_SWEEPS {
        if stale >= STALE_SWEEP_LIMIT || best_cc == 0 {
            break;
        }
        let downward = sweep % 2 == 0;
        let bias_right = sweep % 4 >= 2;
        sweep_layers(g, &mut layering, downward, bias_right);

        let cc = cross_count(g, &layering);
        if cc < best_cc {
            best_cc = cc;
            best = layering.clone();
            stale = 0;
        } else {
            stale += 1;
        }
    }

    assign_order(g, &best);
    best
}

fn assign_order(g: &mut LayoutGraph, layering: &[Vec<usize>]) {
    for layer in layering {
        for (i, &v) in layer.iter().enumerate() {
            g.node_mut(v).order = i;
        }
    }
}

/// Initial layering: nodes sorted by (rank, insertion index), then walked depth first so that
/// connected nodes end up close to each other.
pub(crate) fn init_order(g: &LayoutGraph) -> Vec<Vec<usize>> {
    let Some(max_rank) = g.node_indices().map(|v| g.node(v).rank).max() else {
        return Vec::new();
    };
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    let mut visited = vec![false; g.node_count()];

    let mut start: Vec<usize> = g.node_indices().collect();
    start.sort_by_key(|&v| (g.node(v).rank, v));

    for root in start {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut stack = vec![root];
        while let Some(v) = stack.pop() {
            layers[g.node(v).rank].push(v);
            let successors: Vec<usize> = g.successors(v).collect();
            for w in successors.into_iter().rev() {
                if !visited[w] {
                    visited[w] = true;
                    stack.push(w);
                }
            }
        }
    }

    layers
}

fn sweep_layers(g: &mut LayoutGraph, layering: &mut [Vec<usize>], downward: bool, bias_right: bool) {
    let ranks: Vec<usize> = if downward {
        (1..layering.len()).collect()
    } else {
        (0..layering.len().saturating_sub(1)).rev().collect()
    };

    for r in ranks {
        let barycenters: Vec<Option<f64>> = layering[r]
            .iter()
            .map(|&v| {
                let neighbors: Vec<usize> = if downward {
                    g.predecessors(v).collect()
                } else {
                    g.successors(v).collect()
                };
                if neighbors.is_empty() {
                    return None;
                }
                let sum: f64 = neighbors.iter().map(|&u| g.node(u).order as f64).sum();
                Some(sum / neighbors.len() as f64)
            })
            .collect();

        let sorted = sort_layer(&layering[r], &barycenters, bias_right);
        for (i, &v) in sorted.iter().enumerate() {
            g.node_mut(v).order = i;
        }
        layering[r] = sorted;
    }
}

/// Sorts a layer by barycenter. Nodes without a barycenter keep their current slot; ties are
/// broken by the previous position, leaning left or right depending on `bias_right`.
pub(crate) fn sort_layer(layer: &[usize], barycenters: &[Option<f64>], bias_right: bool) -> Vec<usize> {
    let mut sortable: Vec<(f64, usize, usize)> = Vec::new();
    let mut unsortable: Vec<(usize, usize)> = Vec::new();
    for (i, (&v, bc)) in layer.iter().zip(barycenters).enumerate() {
        match bc {
            Some(bc) => sortable.push((*bc, i, v)),
            None => unsortable.push((i, v)),
        }
    }

    sortable.sort_by(|a, b| {
        a.0.total_cmp(&b.0).then_with(|| {
            if bias_right {
                b.1.cmp(&a.1)
            } else {
                a.1.cmp(&b.1)
            }
        })
    });
    // Reverse so `pop` yields the smallest original index first.
    unsortable.sort_by(|a, b| b.0.cmp(&a.0));

    let mut out: Vec<usize> = Vec::with_capacity(layer.len());
    let consume = |out: &mut Vec<usize>, unsortable: &mut Vec<(usize, usize)>| {
        while let Some(&(i, v)) = unsortable.last() {
            if i > out.len() {
                break;
            }
            out.push(v);
            unsortable.pop();
        }
    };

    consume(&mut out, &mut unsortable);
    for (_, _, v) in sortable {
        out.push(v);
        consume(&mut out, &mut unsortable);
    }
    while let Some((_, v)) = unsortable.pop() {
        out.push(v);
    }
    out
}

/// Total number of edge crossings between all pairs of adjacent layers.
pub(crate) fn cross_count(g: &LayoutGraph, layering: &[Vec<usize>]) -> usize {
    layering
        .windows(2)
        .map(|pair| two_layer_cross_count(g, &pair[0], &pair[1]))
        .sum()
}

/// Accumulator-tree crossing count (Barth, Jünger, Mutzel) between two adjacent layers.
fn two_layer_cross_count(g: &LayoutGraph, north: &[usize], south: &[usize]) -> usize {
    if south.is_empty() {
        return 0;
    }

    let mut south_positions: Vec<usize> = Vec::new();
    for &v in north {
        let mut entries: Vec<usize> = g
            .successors(v)
            .filter(|&w| g.node(w).rank == g.node(v).rank + 1)
            .map(|w| g.node(w).order)
            .collect();
        entries.sort_unstable();
        south_positions.extend(entries);
    }

    let mut first_index: usize = 1;
    while first_index < south.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<usize> = vec![0; tree_size];

    let mut cc: usize = 0;
    for pos in south_positions {
        let mut index = pos + first_index;
        tree[index] += 1;
        let mut weight_sum: usize = 0;
        while index > 0 {
            if index % 2 == 1 {
                weight_sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += weight_sum;
    }

    cc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeLabel, NodeLabel};

    fn ranked_graph(nodes: &[(&str, usize)], edges: &[(usize, usize)]) -> LayoutGraph {
        let mut g = LayoutGraph::new();
        for &(id, rank) in nodes {
            g.set_node(
                id,
                NodeLabel {
                    rank,
                    ..Default::default()
                },
            );
        }
        for (i, &(v, w)) in edges.iter().enumerate() {
            g.add_edge(
                v,
                w,
                EdgeLabel {
                    input: i,
                    reversed: false,
                },
            );
        }
        g
    }

    #[test]
    fn sort_layer_keeps_unsortable_nodes_in_place() {
        let sorted = sort_layer(&[10, 11, 12], &[Some(2.0), None, Some(1.0)], false);
        assert_eq!(sorted, vec![12, 11, 10]);
    }

    #[test]
    fn sort_layer_bias_breaks_ties() {
        assert_eq!(sort_layer(&[1, 2], &[Some(1.0), Some(1.0)], false), vec![1, 2]);
        assert_eq!(sort_layer(&[1, 2], &[Some(1.0), Some(1.0)], true), vec![2, 1]);
    }

    #[test]
    fn counts_a_single_crossing() {
        // a -> d, b -> c with layers [a, b] / [c, d] crosses once.
        let mut g = ranked_graph(
            &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
            &[(0, 3), (1, 2)],
        );
        let layering = vec![vec![0, 1], vec![2, 3]];
        assign_order(&mut g, &layering);
        assert_eq!(cross_count(&g, &layering), 1);
    }

    #[test]
    fn ordering_removes_avoidable_crossing() {
        let mut g = ranked_graph(
            &[("a", 0), ("b", 0), ("c", 1), ("d", 1)],
            &[(0, 3), (1, 2)],
        );
        let layering = order(&mut g);
        assert_eq!(cross_count(&g, &layering), 0);
    }
}
