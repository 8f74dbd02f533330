//! Graph store: thread-safe accumulation of nodes and edges.
//!
//! All mutation funnels through one serialization point (the write lock), so
//! each batch merge is atomic relative to snapshot creation. Readers never see
//! the live structure; analysis always runs against an immutable
//! [`GraphSnapshot`]. Merging is idempotent and commutative: batches may
//! arrive in any completion order, and re-ingesting a unit never inflates
//! counts.

use crate::domain::edge::{EdgeData, EdgeKind};
use crate::domain::extractor::EdgeBatch;
use crate::domain::node::{NodeData, NodeKind, QualifiedName};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Default)]
struct GraphInner {
    graph: DiGraph<NodeData, EdgeData>,
    name_to_index: HashMap<QualifiedName, NodeIndex>,
    seen: HashSet<(NodeIndex, NodeIndex, EdgeKind)>,
}

impl GraphInner {
    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.name_to_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(NodeData::placeholder(name));
        self.name_to_index.insert(name.to_string(), idx);
        idx
    }

    fn declare_node(&mut self, name: &str, kind: NodeKind) -> NodeIndex {
        let idx = self.ensure_node(name);
        let node = &mut self.graph[idx];
        // First declaration wins; a placeholder created from an edge target is
        // upgraded exactly once, keeping merge order-independent.
        if !node.declared {
            node.kind = kind;
            node.declared = true;
        }
        idx
    }
}

/// Thread-safe accumulator for the dependency graph.
pub struct GraphStore {
    inner: RwLock<GraphInner>,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(GraphInner::default()),
        }
    }

    /// Merge one extracted batch. Returns the number of edges actually added;
    /// an identical `(from, to, kind)` edge seen before is a no-op.
    pub fn add_edges(&self, batch: &EdgeBatch) -> usize {
        let mut inner = self.inner.write().unwrap();
        inner.declare_node(&batch.unit, batch.kind);

        let mut added = 0;
        for edge in &batch.edges {
            let from = inner.ensure_node(&edge.from);
            let to = inner.ensure_node(&edge.to);
            if inner.seen.insert((from, to, edge.kind)) {
                inner.graph.add_edge(
                    from,
                    to,
                    EdgeData {
                        kind: edge.kind,
                        origin: edge.origin.clone(),
                    },
                );
                added += 1;
            }
        }
        added
    }

    /// Immutable point-in-time copy of the graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        let inner = self.inner.read().unwrap();
        GraphSnapshot {
            graph: inner.graph.clone(),
            name_to_index: inner.name_to_index.clone(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().unwrap().graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().unwrap().graph.edge_count()
    }
}

/// An immutable point-in-time copy of nodes and edges.
///
/// Never mutated after creation: graph algorithms run against a snapshot
/// without per-read locking, and two analyses of the same snapshot always
/// agree.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    graph: DiGraph<NodeData, EdgeData>,
    name_to_index: HashMap<QualifiedName, NodeIndex>,
}

impl GraphSnapshot {
    pub fn graph(&self) -> &DiGraph<NodeData, EdgeData> {
        &self.graph
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.name_to_index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &NodeData {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct `(from, to)` pairs, collapsing parallel kinds to one edge.
    pub fn simple_edges(&self) -> HashSet<(NodeIndex, NodeIndex)> {
        use petgraph::visit::EdgeRef;
        self.graph
            .edge_references()
            .map(|edge| (edge.source(), edge.target()))
            .collect()
    }
}
