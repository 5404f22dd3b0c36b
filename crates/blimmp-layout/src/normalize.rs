//! Normalize long edges by inserting dummy nodes.
//!
//! After ranking, an edge may span several layers. Ordering and positioning only reason about
//! rank-adjacent edges, so every long edge is split into a chain of unit edges through zero-size
//! dummy nodes, one per intermediate layer. The chain is kept so the router can thread the final
//! route through the dummy positions.

use crate::{LayoutGraph, NodeLabel};

/// Splits long edges and returns, for every edge that existed before the call, the node chain it
/// now runs through (tail first, head last, in graph orientation).
pub(crate) fn run(g: &mut LayoutGraph) -> Vec<Vec<usize>> {
    let edge_count = g.edge_count();
    let mut chains: Vec<Vec<usize>> = Vec::with_capacity(edge_count);

    for e in 0..edge_count {
        let (v, w) = (g.edge(e).v, g.edge(e).w);
        let v_rank = g.node(v).rank;
        let w_rank = g.node(w).rank;

        let mut chain = vec![v];
        if w_rank > v_rank + 1 {
            let label = g.edge(e).label.clone();
            let mut prev: Option<usize> = None;
            for r in (v_rank + 1)..w_rank {
                let dummy = add_dummy_node(g, e, r);
                match prev {
                    None => g.retarget_edge(e, dummy),
                    Some(p) => {
                        g.add_edge(p, dummy, label.clone());
                    }
                }
                chain.push(dummy);
                prev = Some(dummy);
            }
            if let Some(p) = prev {
                g.add_edge(p, w, label);
            }
        }
        chain.push(w);
        chains.push(chain);
    }

    chains
}

fn add_dummy_node(g: &mut LayoutGraph, edge: usize, rank: usize) -> usize {
    let label = NodeLabel {
        rank,
        dummy: true,
        ..Default::default()
    };
    let prefix = format!("_d{edge}_{rank}");
    if !g.has_node(&prefix) {
        return g.set_node(prefix, label);
    }
    for i in 1usize.. {
        let v = format!("{prefix}_{i}");
        if !g.has_node(&v) {
            return g.set_node(v, label);
        }
    }
    unreachable!()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EdgeLabel;

    #[test]
    fn long_edge_becomes_chain_of_unit_edges() {
        let mut g = LayoutGraph::new();
        for (id, rank) in [("a", 0), ("b", 1), ("c", 2), ("d", 3)] {
            g.set_node(
                id,
                NodeLabel {
                    rank,
                    ..Default::default()
                },
            );
        }
        g.add_edge(
            0,
            3,
            EdgeLabel {
                input: 0,
                reversed: false,
            },
        );

        let chains = run(&mut g);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 4);
        assert_eq!(chains[0][0], 0);
        assert_eq!(chains[0][3], 3);
        for pair in chains[0].windows(2) {
            assert_eq!(g.node(pair[1]).rank, g.node(pair[0]).rank + 1);
        }
        assert!(g.node(chains[0][1]).dummy);
        for (_, e) in g.edges() {
            assert_eq!(g.node(e.w).rank, g.node(e.v).rank + 1);
            assert_eq!(e.label.input, 0);
        }
    }

    #[test]
    fn dummy_ids_do_not_clash_with_real_nodes() {
        let mut g = LayoutGraph::new();
        g.set_node(
            "a",
            NodeLabel {
                rank: 0,
                ..Default::default()
            },
        );
        g.set_node(
            "_d0_1",
            NodeLabel {
                rank: 5,
                ..Default::default()
            },
        );
        g.set_node(
            "c",
            NodeLabel {
                rank: 2,
                ..Default::default()
            },
        );
        g.add_edge(
            0,
            2,
            EdgeLabel {
                input: 0,
                reversed: false,
            },
        );

        let chains = run(&mut g);
        let dummy = chains[0][1];
        assert_eq!(g.id(dummy), "_d0_1_1");
    }
}
