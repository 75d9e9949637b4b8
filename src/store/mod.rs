// src/store/mod.rs

//! Durable run state shared between `corec` invocations.
//!
//! - [`parameters`]: resolved parameter/output values.
//! - [`locks`]: advisory named flags.
//! - [`progress`]: mirror of the live execution call stack.
//!
//! Every store re-reads its file before each operation and rewrites it in
//! full on every mutation. There is no file locking: two processes updating
//! the same store concurrently can lose an update (last writer wins).

pub mod locks;
pub mod parameters;
pub mod progress;

pub use locks::LockSet;
pub use parameters::{ParameterStore, Parameters};
pub use progress::{FrameGuard, ProgressTrail};

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::{CorecError, Result};
use crate::fs::FileSystem;

/// Read a flat JSON document, treating a missing file as `T::default()`.
fn read_json<T>(fs: &dyn FileSystem, path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !fs.is_file(path) {
        return Ok(T::default());
    }
    let text = fs.read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&text).map_err(|e| CorecError::format(path, e))
}

/// Rewrite `path` with `value` as pretty JSON plus a trailing newline.
fn write_json<T: Serialize>(fs: &dyn FileSystem, path: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| CorecError::format(path, e))?;
    text.push('\n');
    fs.write(path, text.as_bytes())?;
    Ok(())
}
