// src/engine/resolution.rs

use tracing::{debug, info};

use crate::engine::actions::Action;
use crate::engine::{Engine, LocalBoxFuture, RunSummary, prompt_text};
use crate::errors::{CorecError, Result};
use crate::graph::{EdgeKind, Node, NodeKind, step_dependencies};

impl<'a> Engine<'a> {
    /// Full run: clear locks and progress, collect external inputs, satisfy
    /// every requested output, then report what was produced.
    pub async fn run_pipeline(&mut self) -> Result<RunSummary> {
        if self.policy.mock {
            info!("running in mocking mode (nothing will actually happen)");
        }

        self.ctx.locks.reset()?;
        self.ctx.progress.reset()?;

        self.collect_inputs()?;

        let outputs: Vec<&'a Node> = self.ctx.graph.requested_outputs().collect();
        self.satisfy_outputs(&outputs).await?;

        self.summarize(&outputs)
    }

    /// Phase 1: ask for every externally supplied parameter that is not
    /// stored yet. The store is written once, after all answers are in.
    pub fn collect_inputs(&mut self) -> Result<()> {
        let graph = self.ctx.graph;
        let mut params = self.ctx.params.load()?;

        for parameter in graph.external_parameters() {
            let id = parameter.id();
            info!(parameter = id, "found input parameter");

            if let Some(value) = params.get(id) {
                info!(parameter = id, value = %value, "using saved value");
                continue;
            }

            let value = self.input.prompt(&prompt_text(id))?;
            params.insert(id.to_string(), value);
        }

        self.ctx.params.save(&params)
    }

    /// Phase 2: satisfy each output in order, retrying while advisory locks
    /// are held.
    ///
    /// Outputs already in the parameter store are skipped. After every
    /// attempt the lock set is read; if any lock is active the output is
    /// attempted again after a backoff delay, until the locks clear, the
    /// retry budget runs out, or the run is cancelled.
    pub async fn satisfy_outputs(&mut self, outputs: &[&'a Node]) -> Result<()> {
        let total = outputs.len();
        info!(total, "unsatisfied output nodes");

        for (index, &output) in outputs.iter().enumerate() {
            let id = output.id();

            if self.ctx.params.contains(id)? {
                info!("output node {}/{}: {} has already been satisfied", index + 1, total, id);
                continue;
            }

            let mut retries: u32 = 0;
            loop {
                if self.cancel.is_cancelled() {
                    return Err(CorecError::Cancelled);
                }

                info!("satisfying output node {}/{}: {}", index + 1, total, id);
                self.satisfy_output(output).await?;

                let active = self.ctx.locks.list_active()?;
                if active.is_empty() {
                    break;
                }

                retries += 1;
                if self.policy.retry.exhausted(retries) {
                    return Err(CorecError::LocksStillActive {
                        attempts: retries,
                        locks: active.into_iter().collect(),
                    });
                }

                let delay = self.policy.retry.backoff(retries);
                info!(
                    locks = ?active,
                    retry = retries,
                    delay = ?delay,
                    "found active locks; trying to satisfy the output again"
                );

                let cancel = self.cancel.clone();
                tokio::select! {
                    _ = cancel.cancelled() => return Err(CorecError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        Ok(())
    }

    /// Run every step that declares `output` among its outputs, in edge
    /// declaration order.
    pub async fn satisfy_output(&mut self, output: &'a Node) -> Result<()> {
        let graph = self.ctx.graph;

        for edge in graph
            .incoming(output.id())
            .filter(|e| e.is(EdgeKind::SetsOutputs))
        {
            let producer = graph.resolve(&edge.source)?;
            if producer.kind() != NodeKind::Step {
                debug!(output = output.id(), source = producer.id(), "skipping non-step producer");
                continue;
            }
            self.execute_step(producer).await?;
        }

        Ok(())
    }

    /// Run `step` after recursively running the producers of its inputs.
    ///
    /// Dependencies run depth first in discovery order. Nothing is memoized:
    /// a step reachable through two independent branches runs once per
    /// branch. Re-entering a step that is already on the current call path
    /// fails with [`CorecError::DependencyCycle`].
    pub fn execute_step<'s>(&'s mut self, step: &'a Node) -> LocalBoxFuture<'s, Result<()>> {
        Box::pin(async move {
            let id = step.id();

            if let Some(pos) = self.active.iter().position(|s| s == id) {
                let mut path: Vec<&str> = self.active[pos..].iter().map(String::as_str).collect();
                path.push(id);
                return Err(CorecError::DependencyCycle(path.join(" -> ")));
            }

            let frame = self.ctx.progress.enter_frame(Action::Step.marker(id))?;
            self.active.push(id.to_string());

            let result = self.execute_step_in_frame(step).await;

            self.active.pop();
            result.and(frame.leave())
        })
    }

    async fn execute_step_in_frame(&mut self, step: &'a Node) -> Result<()> {
        let deps = step_dependencies(self.ctx.graph, step)?;

        for dep in deps {
            debug!(
                step = step.id(),
                dependency = dep.step.id(),
                needed_for = ?dep.needed_for,
                "running dependency first"
            );
            self.execute_step(dep.step).await?;
        }

        info!(step = step.id(), "executing step");
        self.run_action(Action::Step, step).await
    }

    /// Run a single step named directly by the operator.
    ///
    /// Missing inputs are asked for interactively rather than produced by
    /// running other steps.
    pub async fn execute_step_explicit(&mut self, step: &'a Node) -> Result<()> {
        let graph = self.ctx.graph;
        let frame = self.ctx.progress.enter_frame(Action::Step.marker(step.id()))?;

        let result: Result<()> = async {
            for need in graph
                .outgoing(step.id())
                .filter(|e| e.is(EdgeKind::NeedsParameter))
            {
                let value = graph.resolve(&need.target)?;
                if self.ctx.params.contains(value.id())? {
                    continue;
                }
                let answer = self.input.prompt(&prompt_text(value.id()))?;
                self.ctx.params.set(value.id(), &answer)?;
            }

            info!(step = step.id(), "executing step");
            self.run_action(Action::Step, step).await
        }
        .await;

        result.and(frame.leave())
    }

    /// Run a tool's installation block. Tools have no dependencies.
    pub async fn install_tool(&mut self, tool: &'a Node) -> Result<()> {
        let frame = self.ctx.progress.enter_frame(Action::Install.marker(tool.id()))?;

        info!(tool = tool.id(), "installing tool");
        let result = self.run_action(Action::Install, tool).await;

        result.and(frame.leave())
    }

    /// Log the value of each output and collect them into a [`RunSummary`].
    pub fn summarize(&self, outputs: &[&'a Node]) -> Result<RunSummary> {
        let params = self.ctx.params.load()?;

        info!("RESULTS");
        info!("=======");

        let mut summary = Vec::with_capacity(outputs.len());
        for output in outputs {
            let id = output.id();
            let value = params.get(id).cloned();
            let shown = match (&value, self.policy.mock) {
                (_, true) => "<MOCKING MODE>",
                (Some(v), false) => v.as_str(),
                (None, false) => "<NOT SET>",
            };
            info!("     {} = {}", id, shown);
            summary.push((id.to_string(), value));
        }
        info!("FINISH");

        Ok(RunSummary { outputs: summary })
    }
}
