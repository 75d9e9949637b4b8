// src/exec/mod.rs

//! Process execution layer and the other outward-facing collaborators of
//! the engine.
//!
//! - [`backend`] provides the `CommandExecutor` trait and the job/outcome
//!   types handed across it.
//! - [`shell`] is the production `bash` executor built on
//!   `tokio::process::Command`.
//! - [`prompt`] provides `InteractiveInput` and a stdin implementation.

pub mod backend;
pub mod prompt;
pub mod shell;

pub use backend::{CommandExecutor, ScriptJob, ScriptOutcome};
pub use prompt::{InteractiveInput, StdinPrompt};
pub use shell::ShellExecutor;
