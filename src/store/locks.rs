// src/store/locks.rs

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::fs::FileSystem;

use super::{read_json, write_json};

/// Durable set of advisory boolean flags.
///
/// The engine never sets a lock itself; scripts (or other processes) call
/// `corec lock` / `corec unlock`, and the output loop keeps retrying while
/// any flag is true. Nothing here excludes anyone.
#[derive(Debug, Clone)]
pub struct LockSet {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl LockSet {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, bool>> {
        read_json(self.fs.as_ref(), &self.path)
    }

    fn set_value(&self, name: &str, value: bool) -> Result<()> {
        let mut locks = self.load()?;
        locks.insert(name.to_string(), value);
        write_json(self.fs.as_ref(), &self.path, &locks)
    }

    /// Clear every flag.
    pub fn reset(&self) -> Result<()> {
        write_json(self.fs.as_ref(), &self.path, &BTreeMap::<String, bool>::new())
    }

    pub fn acquire(&self, name: &str) -> Result<()> {
        self.set_value(name, true)?;
        info!(lock = name, "lock set");
        Ok(())
    }

    pub fn release(&self, name: &str) -> Result<()> {
        self.set_value(name, false)?;
        info!(lock = name, "lock released");
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> Result<bool> {
        Ok(self.load()?.get(name).copied().unwrap_or(false))
    }

    /// Names of the flags that are currently true.
    pub fn list_active(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .load()?
            .into_iter()
            .filter_map(|(name, value)| value.then_some(name))
            .collect())
    }
}
