use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use corec::errors::Result;
use corec::exec::InteractiveInput;
use corec::report::ReportSink;

/// Answers prompts from a fixed queue and records every prompt shown.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    answers: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().map(Into::into).collect())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of prompt texts.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl InteractiveInput for ScriptedInput {
    fn prompt(&mut self, text: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(text.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted answer for prompt: {text}").into())
    }
}

/// Collects report entries as `text: ...` / `file: ...` lines.
#[derive(Debug, Clone, Default)]
pub struct RecordingReport {
    entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.entries)
    }
}

impl ReportSink for RecordingReport {
    fn add_text(&mut self, text: &str) {
        self.entries.lock().unwrap().push(format!("text: {text}"));
    }

    fn add_file(&mut self, path: &Path) {
        self.entries
            .lock()
            .unwrap()
            .push(format!("file: {}", path.display()));
    }
}
