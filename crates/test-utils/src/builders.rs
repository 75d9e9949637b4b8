#![allow(dead_code)]

use serde_json::{json, Value};

use corec::graph::Graph;

/// Builder for pipeline documents, in the same JSON shape `corec` reads
/// from disk.
#[derive(Debug, Clone, Default)]
pub struct PipelineBuilder {
    nodes: Vec<Value>,
    edges: Vec<Value>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameter(mut self, id: &str) -> Self {
        self.nodes.push(json!({ "data": { "id": id, "kind": "Parameter" } }));
        self
    }

    pub fn output(mut self, id: &str) -> Self {
        self.nodes.push(json!({ "data": { "id": id, "kind": "Output" } }));
        self
    }

    pub fn step(mut self, id: &str, script: &str) -> Self {
        self.nodes.push(json!({
            "data": { "id": id, "kind": "Step", "bash_commands": script }
        }));
        self
    }

    pub fn tool(mut self, id: &str, installation: &str) -> Self {
        self.nodes.push(json!({
            "data": { "id": id, "kind": "Tool", "installation": installation }
        }));
        self
    }

    pub fn pipeline(mut self, id: &str, label: &str, parent: Option<&str>) -> Self {
        self.nodes.push(json!({
            "data": { "id": id, "kind": "Pipeline", "label": label, "parent": parent }
        }));
        self
    }

    /// `step` needs `value` before it can run.
    pub fn needs(self, step: &str, value: &str) -> Self {
        self.edge(step, value, "Needs_Parameter")
    }

    /// `step` produces `value`. Stored the way pipelines store it:
    /// `source` is the producer.
    pub fn sets(self, step: &str, value: &str) -> Self {
        self.edge(step, value, "Sets_Outputs")
    }

    pub fn edge(mut self, source: &str, target: &str, kind: &str) -> Self {
        self.edges.push(json!({
            "data": { "source": source, "target": target, "kind": kind }
        }));
        self
    }

    pub fn to_value(&self) -> Value {
        json!({ "elements": { "nodes": self.nodes, "edges": self.edges } })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).expect("pipeline serializes")
    }

    pub fn build(&self) -> Graph {
        Graph::from_json_str(&self.to_json(), "<builder>").expect("builder produced a valid pipeline")
    }
}

/// `P1 -> S1 -> O1`: one input, one step, one requested output.
pub fn single_step_pipeline() -> PipelineBuilder {
    PipelineBuilder::new()
        .parameter("P1")
        .step("S1", "echo S1")
        .output("O1")
        .needs("S1", "P1")
        .sets("S1", "O1")
}

/// `P1 -> A -> X -> B -> O1`: B needs the intermediate value X produced by A.
pub fn chain_pipeline() -> PipelineBuilder {
    PipelineBuilder::new()
        .parameter("P1")
        .step("A", "echo A")
        .parameter("X")
        .step("B", "echo B")
        .output("O1")
        .needs("A", "P1")
        .sets("A", "X")
        .needs("B", "X")
        .sets("B", "O1")
}
