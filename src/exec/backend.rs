// src/exec/backend.rs

//! Pluggable command executor abstraction.
//!
//! The engine hands every step/tool script to a `CommandExecutor` instead of
//! spawning processes itself. Production code uses
//! [`ShellExecutor`](super::shell::ShellExecutor); tests provide a fake that
//! records jobs and emulates what a script would have stored.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::short_uuid;

/// A script ready to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptJob {
    /// Unique file name, e.g. `step_T_1_align_3f2a9c1b7d4e.sh`.
    pub name: String,
    /// Id of the step or tool the script belongs to.
    pub node: String,
    /// Script body as written in the pipeline.
    pub script: String,
}

impl ScriptJob {
    /// Create a job with a freshly generated unique name.
    pub fn new(prefix: &str, node: &str, script: &str) -> Self {
        Self {
            name: script_name(prefix, node),
            node: node.to_string(),
            script: script.to_string(),
        }
    }
}

/// Result of running a script to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// `<prefix>_<node id with '|' replaced>_<12 hex chars>.sh`
pub fn script_name(prefix: &str, node: &str) -> String {
    format!("{}_{}_{}.sh", prefix, node.replace('|', "_"), short_uuid())
}

/// Trait abstracting how scripts are executed.
pub trait CommandExecutor: Send {
    /// Run `job` to completion.
    ///
    /// A non-zero exit code is a normal outcome, not an `Err`; errors are
    /// reserved for failing to run the script at all.
    fn run(
        &mut self,
        job: ScriptJob,
    ) -> Pin<Box<dyn Future<Output = Result<ScriptOutcome>> + Send + '_>>;
}
