// tests/graph_model.rs

mod common;
use crate::common::PipelineBuilder;

use std::error::Error;
use std::path::Path;

use corec::errors::CorecError;
use corec::fs::mock::MockFileSystem;
use corec::graph::validate::{dangling_references, find_step_cycle};
use corec::graph::{step_dependencies, Graph, Node, NodeKind};

type TestResult = Result<(), Box<dyn Error>>;

const PIPELINE: &str = r#"
{
  "elements": {
    "nodes": [
      { "data": { "id": "reads", "kind": "Parameter" } },
      { "data": { "id": "align", "kind": "Step", "bash_commands": "bwa mem $(corec get reads)" } },
      { "data": { "id": "bam", "kind": "Output" } },
      { "data": { "id": "bwa", "kind": "Tool", "installation": "apt-get install bwa" } },
      { "data": { "id": "root", "kind": "Pipeline", "label": "Alignment" } }
    ],
    "edges": [
      { "data": { "source": "align", "target": "reads", "kind": "Needs_Parameter" } },
      { "data": { "source": "align", "target": "bam", "kind": "Sets_Outputs" } }
    ]
  }
}
"#;

#[test]
fn test_load_pipeline_document() -> TestResult {
    let graph = Graph::from_json_str(PIPELINE, "pipeline.json")?;

    assert_eq!(graph.nodes().len(), 5);
    assert_eq!(graph.edges().len(), 2);

    match graph.node("align") {
        Some(Node::Step { commands, .. }) => assert!(commands.starts_with("bwa mem")),
        other => panic!("expected a step, got {other:?}"),
    }
    match graph.node("root") {
        Some(Node::Pipeline { label, parent, .. }) => {
            assert_eq!(label, "Alignment");
            assert_eq!(parent, &None);
        }
        other => panic!("expected a pipeline, got {other:?}"),
    }
    assert_eq!(graph.node("bwa").and_then(Node::script), Some("apt-get install bwa"));
    Ok(())
}

#[test]
fn test_load_through_filesystem() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("pipeline.json", PIPELINE);

    let graph = Graph::load(&fs, Path::new("pipeline.json"))?;
    assert_eq!(graph.nodes_of_kind(NodeKind::Step).count(), 1);
    Ok(())
}

#[test]
fn test_malformed_document_is_format_error() {
    let result = Graph::from_json_str("{ \"elements\": { \"nodes\": [", "broken.json");

    match result {
        Err(CorecError::Format { path, .. }) => assert_eq!(path, "broken.json"),
        Err(e) => panic!("Expected Format error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_node_kind_is_format_error() {
    let text = r#"{ "elements": { "nodes": [ { "data": { "id": "x", "kind": "Widget" } } ], "edges": [] } }"#;

    assert!(matches!(
        Graph::from_json_str(text, "p.json"),
        Err(CorecError::Format { .. })
    ));
}

#[test]
fn test_step_without_commands_is_format_error() {
    let text = r#"{ "elements": { "nodes": [ { "data": { "id": "s", "kind": "Step" } } ], "edges": [] } }"#;

    assert!(matches!(
        Graph::from_json_str(text, "p.json"),
        Err(CorecError::Format { .. })
    ));
}

#[test]
fn test_external_parameters_and_requested_outputs() {
    let graph = common::chain_pipeline().output("unused").build();

    let inputs: Vec<&str> = graph.external_parameters().map(Node::id).collect();
    let outputs: Vec<&str> = graph.requested_outputs().map(Node::id).collect();

    // X is produced by A, so only P1 comes from the operator.
    assert_eq!(inputs, vec!["P1"]);
    // Both outputs are unconsumed, in declaration order.
    assert_eq!(outputs, vec!["O1", "unused"]);
}

#[test]
fn test_output_consumed_by_a_step_is_not_requested() {
    let graph = PipelineBuilder::new()
        .step("A", "a")
        .output("mid")
        .step("B", "b")
        .output("final")
        .sets("A", "mid")
        .needs("B", "mid")
        .sets("B", "final")
        .build();

    let outputs: Vec<&str> = graph.requested_outputs().map(Node::id).collect();
    assert_eq!(outputs, vec!["final"]);
}

#[test]
fn test_step_dependencies_deduplicated_in_discovery_order() -> TestResult {
    let graph = PipelineBuilder::new()
        .step("A", "a")
        .step("B", "b")
        .step("C", "c")
        .parameter("x")
        .parameter("y")
        .parameter("z")
        .sets("B", "x")
        .sets("A", "y")
        .sets("B", "z")
        .needs("C", "x")
        .needs("C", "y")
        .needs("C", "z")
        .build();

    let step = graph.resolve_kind("C", NodeKind::Step)?;
    let deps = step_dependencies(&graph, step)?;

    let order: Vec<&str> = deps.iter().map(|d| d.step.id()).collect();
    assert_eq!(order, vec!["B", "A"]);
    assert_eq!(deps[0].needed_for.iter().copied().collect::<Vec<_>>(), vec!["x", "z"]);
    Ok(())
}

#[test]
fn test_step_is_not_its_own_dependency() -> TestResult {
    let graph = PipelineBuilder::new()
        .step("S", "s")
        .parameter("acc")
        .needs("S", "acc")
        .sets("S", "acc")
        .build();

    let step = graph.resolve_kind("S", NodeKind::Step)?;
    assert!(step_dependencies(&graph, step)?.is_empty());
    Ok(())
}

#[test]
fn test_dangling_references_are_reported() {
    let graph = PipelineBuilder::new()
        .step("S", "s")
        .needs("S", "ghost")
        .sets("S", "ghost")
        .build();

    assert_eq!(dangling_references(&graph), vec!["ghost".to_string()]);
}

#[test]
fn test_find_step_cycle() -> TestResult {
    let acyclic = common::chain_pipeline().build();
    assert_eq!(find_step_cycle(&acyclic)?, None);

    let cyclic = PipelineBuilder::new()
        .step("A", "a")
        .step("B", "b")
        .parameter("x")
        .parameter("y")
        .sets("A", "x")
        .needs("B", "x")
        .sets("B", "y")
        .needs("A", "y")
        .build();

    let on_cycle = find_step_cycle(&cyclic)?.expect("cycle expected");
    assert!(on_cycle == "A" || on_cycle == "B");
    Ok(())
}
