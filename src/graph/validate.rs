// src/graph/validate.rs

//! Static diagnostics over a loaded pipeline.
//!
//! None of these are enforced at load time: a run only fails when the engine
//! actually follows a dangling reference or walks into a cycle. `corec check`
//! reports them up front.

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::Result;
use crate::graph::deps::step_dependencies;
use crate::graph::{Graph, NodeKind};

/// Edge endpoints that do not resolve to any node.
pub fn dangling_references(graph: &Graph) -> Vec<String> {
    let mut missing = Vec::new();
    for edge in graph.edges() {
        for id in [&edge.source, &edge.target] {
            if graph.resolve(id).is_err() && !missing.contains(id) {
                missing.push(id.clone());
            }
        }
    }
    missing
}

/// Look for a cycle in the step dependency relation.
///
/// Edge direction: producer -> consumer. Returns the id of a step on a cycle.
pub fn find_step_cycle(graph: &Graph) -> Result<Option<String>> {
    let mut deps: DiGraphMap<&str, ()> = DiGraphMap::new();

    for step in graph.nodes_of_kind(NodeKind::Step) {
        deps.add_node(step.id());
        for dep in step_dependencies(graph, step)? {
            deps.add_edge(dep.step.id(), step.id(), ());
        }
    }

    match toposort(&deps, None) {
        Ok(_order) => Ok(None),
        Err(cycle) => Ok(Some(cycle.node_id().to_string())),
    }
}
