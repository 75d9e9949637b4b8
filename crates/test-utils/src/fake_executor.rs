use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use corec::errors::Result;
use corec::exec::{CommandExecutor, ScriptJob, ScriptOutcome};
use corec::store::{LockSet, ParameterStore, ProgressTrail};

/// Something a fake script "does" when it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `corec set <key> <value>`
    Set(String, String),
    /// `corec lock <name>`
    Lock(String),
    /// `corec unlock <name>`
    Unlock(String),
    /// Exit with this code instead of 0.
    Exit(i32),
}

impl Effect {
    pub fn set(key: &str, value: &str) -> Self {
        Effect::Set(key.to_string(), value.to_string())
    }

    pub fn lock(name: &str) -> Self {
        Effect::Lock(name.to_string())
    }

    pub fn unlock(name: &str) -> Self {
        Effect::Unlock(name.to_string())
    }
}

/// A fake executor that:
/// - records every job it is handed (in order)
/// - optionally snapshots the progress trail while the "script" runs
/// - applies scripted effects to the stores, the way a real script calling
///   back into `corec` would
pub struct FakeExecutor {
    params: ParameterStore,
    locks: LockSet,
    progress: Option<ProgressTrail>,
    executed: Arc<Mutex<Vec<ScriptJob>>>,
    trails: Arc<Mutex<Vec<String>>>,
    /// node id -> effects applied on every run.
    always: HashMap<String, Vec<Effect>>,
    /// (node id, 1-based run number) -> effects applied on that run only.
    nth: HashMap<(String, usize), Vec<Effect>>,
}

impl FakeExecutor {
    pub fn new(params: ParameterStore, locks: LockSet) -> Self {
        Self {
            params,
            locks,
            progress: None,
            executed: Arc::new(Mutex::new(Vec::new())),
            trails: Arc::new(Mutex::new(Vec::new())),
            always: HashMap::new(),
            nth: HashMap::new(),
        }
    }

    /// Record the progress trail content at the start of each job.
    pub fn with_progress(mut self, trail: ProgressTrail) -> Self {
        self.progress = Some(trail);
        self
    }

    /// Apply `effect` every time `node` runs.
    pub fn on(mut self, node: &str, effect: Effect) -> Self {
        self.always.entry(node.to_string()).or_default().push(effect);
        self
    }

    /// Apply `effect` only on the `run`-th execution of `node` (1-based).
    pub fn on_nth(mut self, node: &str, run: usize, effect: Effect) -> Self {
        self.nth
            .entry((node.to_string(), run))
            .or_default()
            .push(effect);
        self
    }

    /// Shared log of executed jobs.
    pub fn executed(&self) -> Arc<Mutex<Vec<ScriptJob>>> {
        Arc::clone(&self.executed)
    }

    /// Shared log of progress trail snapshots, one per job.
    pub fn trails(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.trails)
    }

    fn apply(&self, effects: &[Effect], exit_code: &mut i32) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Set(key, value) => self.params.set(key, value)?,
                Effect::Lock(name) => self.locks.acquire(name)?,
                Effect::Unlock(name) => self.locks.release(name)?,
                Effect::Exit(code) => *exit_code = *code,
            }
        }
        Ok(())
    }

    fn run_sync(&mut self, job: ScriptJob) -> Result<ScriptOutcome> {
        if let Some(trail) = &self.progress {
            let snapshot = trail.read()?;
            self.trails.lock().unwrap().push(snapshot);
        }

        let run = {
            let mut executed = self.executed.lock().unwrap();
            executed.push(job.clone());
            executed.iter().filter(|j| j.node == job.node).count()
        };

        let mut exit_code = 0;
        if let Some(effects) = self.always.get(&job.node) {
            self.apply(effects, &mut exit_code)?;
        }
        if let Some(effects) = self.nth.get(&(job.node.clone(), run)) {
            self.apply(effects, &mut exit_code)?;
        }

        Ok(ScriptOutcome {
            exit_code,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

impl CommandExecutor for FakeExecutor {
    fn run(
        &mut self,
        job: ScriptJob,
    ) -> Pin<Box<dyn Future<Output = Result<ScriptOutcome>> + Send + '_>> {
        let outcome = self.run_sync(job);
        Box::pin(async move { outcome })
    }
}

/// Node ids of the recorded jobs, in execution order.
pub fn executed_nodes(log: &Arc<Mutex<Vec<ScriptJob>>>) -> Vec<String> {
    log.lock().unwrap().iter().map(|j| j.node.clone()).collect()
}
