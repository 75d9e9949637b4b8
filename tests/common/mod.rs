#![allow(dead_code)]

use std::sync::{Arc, Mutex};

pub use corec_test_utils::builders::{chain_pipeline, single_step_pipeline, PipelineBuilder};
pub use corec_test_utils::fake_executor::{executed_nodes, Effect, FakeExecutor};
pub use corec_test_utils::fakes::{RecordingReport, ScriptedInput};
pub use corec_test_utils::{init_tracing, with_timeout};

use corec::engine::{Collaborators, Engine, RunContext};
use corec::exec::ScriptJob;
use corec::fs::mock::MockFileSystem;
use corec::graph::Graph;
use corec::store::{LockSet, ParameterStore, ProgressTrail};
use corec::types::RunPolicy;

/// In-memory project: a graph plus the three stores on a `MockFileSystem`.
pub struct Harness {
    pub fs: MockFileSystem,
    pub graph: Graph,
    pub params: ParameterStore,
    pub locks: LockSet,
    pub progress: ProgressTrail,
}

impl Harness {
    pub fn new(pipeline: &PipelineBuilder) -> Self {
        let fs = MockFileSystem::new();
        let shared: Arc<MockFileSystem> = Arc::new(fs.clone());
        Self {
            graph: pipeline.build(),
            params: ParameterStore::new(shared.clone(), "corec_parameters.json"),
            locks: LockSet::new(shared.clone(), "corec_locks.json"),
            progress: ProgressTrail::new(shared, "corec_progress.txt"),
            fs,
        }
    }

    pub fn context(&self) -> RunContext<'_> {
        RunContext {
            graph: &self.graph,
            params: &self.params,
            locks: &self.locks,
            progress: &self.progress,
        }
    }

    /// Fake executor wired to this harness' stores.
    pub fn executor(&self) -> FakeExecutor {
        FakeExecutor::new(self.params.clone(), self.locks.clone())
            .with_progress(self.progress.clone())
    }
}

/// Logs shared with the collaborators handed to an [`Engine`].
pub struct Recorded {
    pub executed: Arc<Mutex<Vec<ScriptJob>>>,
    pub trails: Arc<Mutex<Vec<String>>>,
    pub prompts: Arc<Mutex<Vec<String>>>,
    pub report: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    pub fn nodes(&self) -> Vec<String> {
        executed_nodes(&self.executed)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn trails(&self) -> Vec<String> {
        self.trails.lock().unwrap().clone()
    }
}

pub fn build_engine<'a>(
    harness: &'a Harness,
    executor: FakeExecutor,
    input: ScriptedInput,
    policy: RunPolicy,
) -> (Engine<'a>, Recorded) {
    let report = RecordingReport::new();
    let recorded = Recorded {
        executed: executor.executed(),
        trails: executor.trails(),
        prompts: input.prompts(),
        report: report.entries(),
    };
    let collaborators = Collaborators {
        executor: Box::new(executor),
        input: Box::new(input),
        report: Box::new(report),
    };
    (Engine::new(harness.context(), collaborators, policy), recorded)
}
