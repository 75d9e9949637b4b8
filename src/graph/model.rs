// src/graph/model.rs

use std::fmt;

use serde::Deserialize;

/// A pipeline element.
///
/// Deserialized from the `data` object of a node, tagged by its `kind` field:
///
/// ```json
/// { "data": { "id": "align", "kind": "Step", "bash_commands": "bwa mem ..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    Parameter {
        id: String,
    },
    Output {
        id: String,
    },
    Step {
        id: String,
        /// Shell script body executed for this step.
        #[serde(rename = "bash_commands")]
        commands: String,
    },
    Tool {
        id: String,
        /// One-shot setup script.
        installation: String,
    },
    Pipeline {
        id: String,
        label: String,
        #[serde(default)]
        parent: Option<String>,
    },
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Parameter { id }
            | Node::Output { id }
            | Node::Step { id, .. }
            | Node::Tool { id, .. }
            | Node::Pipeline { id, .. } => id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Parameter { .. } => NodeKind::Parameter,
            Node::Output { .. } => NodeKind::Output,
            Node::Step { .. } => NodeKind::Step,
            Node::Tool { .. } => NodeKind::Tool,
            Node::Pipeline { .. } => NodeKind::Pipeline,
        }
    }

    /// The script attached to a step or tool.
    pub fn script(&self) -> Option<&str> {
        match self {
            Node::Step { commands, .. } => Some(commands),
            Node::Tool { installation, .. } => Some(installation),
            _ => None,
        }
    }
}

/// Discriminant of [`Node`], used for filtering and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Parameter,
    Output,
    Step,
    Tool,
    Pipeline,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Parameter => "Parameter",
            NodeKind::Output => "Output",
            NodeKind::Step => "Step",
            NodeKind::Tool => "Tool",
            NodeKind::Pipeline => "Pipeline",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum EdgeKind {
    /// `step -> value`: the step needs the value before it can run.
    #[serde(rename = "Needs_Parameter")]
    NeedsParameter,
    /// `step -> value`: the step produces the value.
    #[serde(rename = "Sets_Outputs")]
    SetsOutputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn is(&self, kind: EdgeKind) -> bool {
        self.kind == kind
    }
}
