// src/graph/resolver.rs

//! Node identity lookup.
//!
//! Ids are either a single token or a `|`-delimited composite. A template
//! expanded several times produces ids like `T|I|L` (template, instance,
//! leaf). A step defined once in the template refers to a peer as `T|L`,
//! which matches any instance of that leaf.

use crate::errors::{CorecError, Result};
use crate::graph::{Graph, Node, NodeKind};

pub const ID_SEPARATOR: char = '|';

/// Split an id into its `|`-delimited segments.
pub fn segments(id: &str) -> Vec<&str> {
    id.split(ID_SEPARATOR).collect()
}

/// Whether `candidate` is an instance of the two-segment reference `reference`.
fn is_instance_of(candidate: &str, reference: &[&str]) -> bool {
    let parts = segments(candidate);
    parts.len() == 3 && parts[0] == reference[0] && parts[2] == reference[1]
}

impl Graph {
    /// Resolve `id` to a node.
    ///
    /// Exact matches win. Otherwise a two-segment `T|L` resolves to the first
    /// declared node `T|<instance>|L`.
    pub fn resolve(&self, id: &str) -> Result<&Node> {
        if let Some(node) = self.node(id) {
            return Ok(node);
        }

        let reference = segments(id);
        if reference.len() == 2 {
            if let Some(node) = self
                .nodes()
                .iter()
                .find(|n| is_instance_of(n.id(), &reference))
            {
                return Ok(node);
            }
        }

        Err(CorecError::NodeNotFound(id.to_string()))
    }

    /// Resolve `id` and require the node to be of `kind`.
    pub fn resolve_kind(&self, id: &str, kind: NodeKind) -> Result<&Node> {
        let node = self.resolve(id)?;
        if node.kind() != kind {
            return Err(CorecError::UnexpectedKind {
                id: node.id().to_string(),
                expected: kind,
                found: node.kind(),
            });
        }
        Ok(node)
    }
}
