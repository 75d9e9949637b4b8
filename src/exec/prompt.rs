// src/exec/prompt.rs

use std::io::{self, BufRead, Write};

use anyhow::Context;

use crate::errors::Result;

/// Source of operator-supplied values. Blocks until an answer is available.
pub trait InteractiveInput: Send {
    fn prompt(&mut self, text: &str) -> Result<String>;
}

/// Prompts on stdout and reads one line from stdin.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl InteractiveInput for StdinPrompt {
    fn prompt(&mut self, text: &str) -> Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{text}")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("reading answer from stdin")?;
        if read == 0 {
            return Err(anyhow::anyhow!("stdin closed while waiting for: {}", text.trim()).into());
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
