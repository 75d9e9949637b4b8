// src/store/parameters.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{CorecError, Result};
use crate::fs::FileSystem;

use super::{read_json, write_json};

/// Snapshot of the parameter file.
pub type Parameters = BTreeMap<String, String>;

/// Durable key/value store for resolved parameters and outputs.
///
/// Presence of a key is what marks a value as resolved.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl ParameterStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current state from disk. A missing file is created empty.
    pub fn load(&self) -> Result<Parameters> {
        if !self.fs.is_file(&self.path) {
            debug!(path = %self.path.display(), "creating empty parameter file");
            self.save(&Parameters::new())?;
        }
        read_json(self.fs.as_ref(), &self.path)
    }

    pub fn save(&self, params: &Parameters) -> Result<()> {
        write_json(self.fs.as_ref(), &self.path, params)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.load()?.contains_key(key))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut params = self.load()?;
        params.insert(key.to_string(), value.to_string());
        self.save(&params)?;
        info!(parameter = key, value, "parameter set");
        Ok(())
    }

    /// Copy the value of `existing` into `new_key`.
    ///
    /// Fails with [`CorecError::UnknownParameter`] and leaves the file
    /// untouched when `existing` is not set.
    pub fn merge_into(&self, existing: &str, new_key: &str) -> Result<()> {
        let mut params = self.load()?;
        let value = params
            .get(existing)
            .cloned()
            .ok_or_else(|| CorecError::UnknownParameter(existing.to_string()))?;
        params.insert(new_key.to_string(), value);
        self.save(&params)?;
        info!(from = existing, to = new_key, "parameter merged");
        Ok(())
    }
}
