//! Break cycles by reversing a feedback arc set (FAS).
//!
//! The FAS is found with a depth-first search that visits nodes in insertion order and collects
//! every edge pointing back into the active DFS stack. Reversed edges keep their label, flagged
//! with `reversed`, so routing can restore the original direction afterwards.

use crate::LayoutGraph;

/// Reverses the feedback arc set in place and returns the indices of the reversed edges.
pub(crate) fn run(g: &mut LayoutGraph) -> Vec<usize> {
    let fas = dfs_fas(g);
    for &e in &fas {
        g.reverse_edge(e);
        g.edge_mut(e).reversed = true;
    }
    fas
}

fn dfs_fas(g: &LayoutGraph) -> Vec<usize> {
    let n = g.node_count();
    let mut fas: Vec<usize> = Vec::new();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];

    // Explicit stack of (node, next out-edge cursor) so deep chains cannot overflow.
    for root in g.node_indices() {
        if visited[root] {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        visited[root] = true;
        on_stack[root] = true;

        while let Some(top) = stack.last_mut() {
            let v = top.0;
            let out = g.out_edges(v);
            if top.1 >= out.len() {
                on_stack[v] = false;
                stack.pop();
                continue;
            }
            let e = out[top.1];
            top.1 += 1;

            let w = g.edge(e).w;
            if on_stack[w] {
                fas.push(e);
            } else if !visited[w] {
                visited[w] = true;
                on_stack[w] = true;
                stack.push((w, 0));
            }
        }
    }

    fas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeLabel, NodeLabel};

    fn graph(ids: &[&str], edges: &[(usize, usize)]) -> LayoutGraph {
        let mut g = LayoutGraph::new();
        for id in ids {
            g.set_node(*id, NodeLabel::default());
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
    fn leaves_acyclic_graph_untouched() {
        let mut g = graph(&["a", "b", "c", "d"], &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        assert!(run(&mut g).is_empty());
    }

    #[test]
    fn reverses_back_edge_of_a_triangle() {
        let mut g = graph(&["a", "b", "c"], &[(0, 1), (1, 2), (2, 0)]);
        let reversed = run(&mut g);
        assert_eq!(reversed, vec![2]);
        let e = g.edge(2);
        assert_eq!((e.v, e.w), (0, 2));
        assert!(e.label.reversed);
    }

    #[test]
    fn two_cycle_reverses_exactly_one_edge() {
        let mut g = graph(&["a", "b"], &[(0, 1), (1, 0)]);
        assert_eq!(run(&mut g), vec![1]);
    }
}
