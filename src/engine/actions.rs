// src/engine/actions.rs

use std::time::Instant;

use tracing::{error, info, warn};

use crate::engine::Engine;
use crate::errors::{CorecError, Result};
use crate::exec::ScriptJob;
use crate::graph::{Node, NodeKind};

/// The two kinds of script a node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A step's `bash_commands`.
    Step,
    /// A tool's `installation` block.
    Install,
}

impl Action {
    /// Progress trail marker for a frame running this action on `id`.
    pub fn marker(self, id: &str) -> String {
        match self {
            Action::Step => format!("STEP: {id}"),
            Action::Install => format!("INSTALL: {id}"),
        }
    }

    /// Prefix of generated script names.
    pub fn script_prefix(self) -> &'static str {
        match self {
            Action::Step => "step",
            Action::Install => "tool",
        }
    }

    fn node_kind(self) -> NodeKind {
        match self {
            Action::Step => NodeKind::Step,
            Action::Install => NodeKind::Tool,
        }
    }
}

impl<'a> Engine<'a> {
    /// Submit the script of `node` to the executor, time it, report it and
    /// apply the failure policy.
    pub(crate) async fn run_action(&mut self, action: Action, node: &'a Node) -> Result<()> {
        let id = node.id();
        let script = match (node.kind() == action.node_kind(), node.script()) {
            (true, Some(script)) => script,
            _ => {
                return Err(CorecError::UnexpectedKind {
                    id: id.to_string(),
                    expected: action.node_kind(),
                    found: node.kind(),
                });
            }
        };

        if self.policy.mock {
            info!(node = id, "mocking mode: skipping script");
            return Ok(());
        }

        let job = ScriptJob::new(action.script_prefix(), id, script);
        let script_name = job.name.clone();

        let started = Instant::now();
        let outcome = self.executor.run(job).await?;
        let elapsed = started.elapsed();

        info!(
            node = id,
            script = %script_name,
            exit_code = outcome.exit_code,
            elapsed = ?elapsed,
            "script finished"
        );
        self.report.add_text(&format!(
            "{} {}: exit code {} after {:.2}s",
            action.script_prefix(),
            id,
            outcome.exit_code,
            elapsed.as_secs_f64()
        ));

        if !outcome.success() {
            warn!(node = id, exit_code = outcome.exit_code, "return code is not zero");
            if self.policy.on_script_failure.is_fail_fast() {
                error!(node = id, "exiting (fail)");
                return Err(CorecError::ScriptFailure {
                    node: id.to_string(),
                    code: outcome.exit_code,
                });
            }
            warn!(node = id, "ignoring non-zero return code; continuing");
        }

        Ok(())
    }
}
