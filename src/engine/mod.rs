// src/engine/mod.rs

//! Resolution engine.
//!
//! Given the pipeline graph and the three durable stores, the engine
//! satisfies requested outputs by running the steps that produce them,
//! recursively running the producers of every input those steps need first.
//!
//! - [`resolution`] holds the two run phases and the recursive step walk.
//! - [`actions`] submits step/tool scripts to the executor and applies the
//!   failure policy.
//!
//! Execution is strictly sequential: one script at a time, depth first.

pub mod actions;
pub mod resolution;

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::exec::{CommandExecutor, InteractiveInput};
use crate::graph::Graph;
use crate::report::ReportSink;
use crate::store::{LockSet, ParameterStore, ProgressTrail};
use crate::types::RunPolicy;

pub use actions::Action;

/// Boxed future that may borrow the engine; used to recurse through steps.
pub type LocalBoxFuture<'s, T> = Pin<Box<dyn Future<Output = T> + 's>>;

/// Everything a run reads from and writes to.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub graph: &'a Graph,
    pub params: &'a ParameterStore,
    pub locks: &'a LockSet,
    pub progress: &'a ProgressTrail,
}

/// External collaborators the engine calls out to.
pub struct Collaborators {
    pub executor: Box<dyn CommandExecutor>,
    pub input: Box<dyn InteractiveInput>,
    pub report: Box<dyn ReportSink>,
}

/// Value of every requested output after a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outputs: Vec<(String, Option<String>)>,
}

impl RunSummary {
    pub fn value_of(&self, output: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|(id, _)| id == output)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn all_set(&self) -> bool {
        self.outputs.iter().all(|(_, value)| value.is_some())
    }
}

pub struct Engine<'a> {
    ctx: RunContext<'a>,
    executor: Box<dyn CommandExecutor>,
    input: Box<dyn InteractiveInput>,
    report: Box<dyn ReportSink>,
    policy: RunPolicy,
    cancel: CancellationToken,
    /// Ids of the steps currently being executed, outermost first.
    active: Vec<String>,
}

impl<'a> Engine<'a> {
    pub fn new(ctx: RunContext<'a>, collaborators: Collaborators, policy: RunPolicy) -> Self {
        Self {
            ctx,
            executor: collaborators.executor,
            input: collaborators.input,
            report: collaborators.report,
            policy,
            cancel: CancellationToken::new(),
            active: Vec::new(),
        }
    }

    /// Abort lock polling when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &RunPolicy {
        &self.policy
    }

    pub fn context(&self) -> RunContext<'a> {
        self.ctx
    }
}

/// Text shown when asking the operator for a parameter value.
pub fn prompt_text(parameter: &str) -> String {
    format!("Insert the value of parameter: {parameter} : ")
}
