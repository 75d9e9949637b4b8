// src/graph/deps.rs

use std::collections::BTreeSet;

use crate::errors::Result;
use crate::graph::{EdgeKind, Graph, Node, NodeKind};

/// A step that must run before another because it produces one of that
/// step's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDependency<'g> {
    pub step: &'g Node,
    /// Ids of the values the dependent step needs from `step`.
    pub needed_for: BTreeSet<&'g str>,
}

/// Direct producer steps of everything `step` needs, in discovery order,
/// deduplicated by id.
///
/// Walks `Needs_Parameter` edges out of `step`, resolves each target (which
/// may be a cross-instance `T|L` reference), then collects the sources of
/// `Sets_Outputs` edges into that value. `step` itself is never its own
/// dependency; non-step producers are ignored. Any unresolvable id is an
/// error.
pub fn step_dependencies<'g>(graph: &'g Graph, step: &'g Node) -> Result<Vec<StepDependency<'g>>> {
    let mut deps: Vec<StepDependency<'g>> = Vec::new();

    for need in graph
        .outgoing(step.id())
        .filter(|e| e.is(EdgeKind::NeedsParameter))
    {
        let value = graph.resolve(&need.target)?;

        for set in graph
            .incoming(value.id())
            .filter(|e| e.is(EdgeKind::SetsOutputs))
        {
            let producer = graph.resolve(&set.source)?;
            if producer.kind() != NodeKind::Step || producer.id() == step.id() {
                continue;
            }

            match deps.iter_mut().find(|d| d.step.id() == producer.id()) {
                Some(existing) => {
                    existing.needed_for.insert(value.id());
                }
                None => deps.push(StepDependency {
                    step: producer,
                    needed_for: BTreeSet::from([value.id()]),
                }),
            }
        }
    }

    Ok(deps)
}
