// src/graph/loader.rs

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{CorecError, Result};
use crate::fs::FileSystem;
use crate::graph::{Edge, Graph, Node};

/// On-disk pipeline document (cytoscape-style export).
#[derive(Debug, Deserialize)]
struct RawPipeline {
    elements: RawElements,
}

#[derive(Debug, Deserialize)]
struct RawElements {
    nodes: Vec<RawElement<Node>>,
    edges: Vec<RawElement<Edge>>,
}

#[derive(Debug, Deserialize)]
struct RawElement<T> {
    data: T,
}

impl Graph {
    /// Parse a pipeline document. `origin` is only used in error messages.
    pub fn from_json_str(text: &str, origin: impl AsRef<Path>) -> Result<Graph> {
        let raw: RawPipeline =
            serde_json::from_str(text).map_err(|e| CorecError::format(&origin, e))?;

        let nodes: Vec<Node> = raw.elements.nodes.into_iter().map(|n| n.data).collect();
        let edges: Vec<Edge> = raw.elements.edges.into_iter().map(|e| e.data).collect();

        debug!(
            origin = %origin.as_ref().display(),
            nodes = nodes.len(),
            edges = edges.len(),
            "loaded pipeline graph"
        );

        Ok(Graph::new(nodes, edges))
    }

    /// Read and parse the pipeline file at `path`.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Graph> {
        let text = fs.read_to_string(path)?;
        Graph::from_json_str(&text, path)
    }
}
