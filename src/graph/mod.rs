// src/graph/mod.rs

//! Pipeline graph: nodes, edges and identity lookup.
//!
//! - [`model`] defines the tagged node/edge types.
//! - [`loader`] parses the JSON pipeline document.
//! - [`resolver`] implements exact and cross-instance id lookup.
//! - [`deps`] derives step-to-step dependencies from shared values.
//! - [`validate`] holds diagnostics used by `corec check`.

pub mod deps;
pub mod loader;
pub mod model;
pub mod resolver;
pub mod validate;

use std::collections::HashMap;

pub use deps::{StepDependency, step_dependencies};
pub use model::{Edge, EdgeKind, Node, NodeKind};

/// Immutable in-memory pipeline.
///
/// Nodes and edges keep their declaration order; producer selection and
/// output ordering depend on it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Exact id -> position of the first node declared with that id.
    index: HashMap<String, usize>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            index.entry(node.id().to_string()).or_insert(pos);
        }
        Self {
            nodes,
            edges,
            index,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Exact id lookup (no cross-instance addressing).
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// Edges whose `source` is `id`.
    pub fn outgoing<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g Edge> {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Edges whose `target` is `id`.
    pub fn incoming<'g>(&'g self, id: &'g str) -> impl Iterator<Item = &'g Edge> {
        self.edges.iter().filter(move |e| e.target == id)
    }

    fn is_targeted_by(&self, id: &str, kind: EdgeKind) -> bool {
        self.incoming(id).any(|e| e.is(kind))
    }

    /// Parameters that no step produces; they must be supplied by the operator.
    pub fn external_parameters(&self) -> impl Iterator<Item = &Node> {
        self.nodes_of_kind(NodeKind::Parameter)
            .filter(|n| !self.is_targeted_by(n.id(), EdgeKind::SetsOutputs))
    }

    /// Outputs that no step consumes; these are what a full run must produce.
    pub fn requested_outputs(&self) -> impl Iterator<Item = &Node> {
        self.nodes_of_kind(NodeKind::Output)
            .filter(|n| !self.is_targeted_by(n.id(), EdgeKind::NeedsParameter))
    }
}
