//! Insertion-ordered directed multigraph used by the layout passes.
//!
//! Nodes are addressed by string id and edges by their insertion index. Iteration order always
//! follows insertion order so every pass built on top of this container is deterministic.

use rustc_hash::FxHashMap as HashMap;

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
}

#[derive(Debug, Clone)]
pub struct EdgeEntry<E> {
    pub v: usize,
    pub w: usize,
    pub label: E,
}

#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,
    edges: Vec<EdgeEntry<E>>,
    out: Vec<Vec<usize>>,
    in_: Vec<Vec<usize>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            out: Vec::new(),
            in_: Vec::new(),
        }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node, or replaces the label of an existing one. Returns the node index.
    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> usize {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self.out.push(Vec::new());
        self.in_.push(Vec::new());
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn id(&self, idx: usize) -> &str {
        self.nodes[idx].id.as_str()
    }

    pub fn node(&self, idx: usize) -> &N {
        &self.nodes[idx].label
    }

    pub fn node_mut(&mut self, idx: usize) -> &mut N {
        &mut self.nodes[idx].label
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_indices(&self) -> std::ops::Range<usize> {
        0..self.nodes.len()
    }

    /// Adds an edge between two existing node indices. Parallel edges are allowed.
    pub fn add_edge(&mut self, v: usize, w: usize, label: E) -> usize {
        let idx = self.edges.len();
        self.edges.push(EdgeEntry { v, w, label });
        self.out[v].push(idx);
        self.in_[w].push(idx);
        idx
    }

    pub fn edge(&self, idx: usize) -> &EdgeEntry<E> {
        &self.edges[idx]
    }

    pub fn edge_mut(&mut self, idx: usize) -> &mut E {
        &mut self.edges[idx].label
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, &EdgeEntry<E>)> {
        self.edges.iter().enumerate()
    }

    /// Flips the direction of an edge in place, keeping its index and label.
    pub fn reverse_edge(&mut self, idx: usize) {
        let (v, w) = (self.edges[idx].v, self.edges[idx].w);
        self.out[v].retain(|&e| e != idx);
        self.in_[w].retain(|&e| e != idx);
        self.edges[idx].v = w;
        self.edges[idx].w = v;
        self.out[w].push(idx);
        self.in_[v].push(idx);
    }

    /// Re-points an edge at a new head node, keeping its tail.
    pub fn retarget_edge(&mut self, idx: usize, w: usize) {
        let old = self.edges[idx].w;
        self.in_[old].retain(|&e| e != idx);
        self.edges[idx].w = w;
        self.in_[w].push(idx);
    }

    pub fn out_edges(&self, v: usize) -> &[usize] {
        &self.out[v]
    }

    pub fn in_edges(&self, v: usize) -> &[usize] {
        &self.in_[v]
    }

    pub fn successors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.out[v].iter().map(move |&e| self.edges[e].w)
    }

    pub fn predecessors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.in_[v].iter().map(move |&e| self.edges[e].v)
    }

    pub fn sources(&self) -> Vec<usize> {
        self.node_indices()
            .filter(|&v| self.in_[v].is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_edge_updates_adjacency() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.set_node("a", ());
        let b = g.set_node("b", ());
        let e = g.add_edge(a, b, ());

        g.reverse_edge(e);
        assert_eq!(g.out_edges(b), &[e]);
        assert_eq!(g.in_edges(a), &[e]);
        assert!(g.out_edges(a).is_empty());
        assert_eq!(g.sources(), vec![b]);
    }

    #[test]
    fn set_node_replaces_label_for_known_id() {
        let mut g: Graph<u32, ()> = Graph::new();
        let first = g.set_node("a", 1);
        let second = g.set_node("a", 2);
        assert_eq!(first, second);
        assert_eq!(*g.node(first), 2);
        assert_eq!(g.node_count(), 1);
    }
}
