// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::Path;

use thiserror::Error;

use crate::graph::NodeKind;

#[derive(Error, Debug)]
pub enum CorecError {
    /// A pipeline or store document could not be parsed.
    #[error("Format error in {path}: {message}")]
    Format { path: String, message: String },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node '{id}' is a {found}, expected a {expected}")]
    UnexpectedKind {
        id: String,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("Error in merge: parameter {0} does not exist")]
    UnknownParameter(String),

    #[error("Script for '{node}' exited with code {code}")]
    ScriptFailure { node: String, code: i32 },

    #[error("Cycle detected in step dependencies: {0}")]
    DependencyCycle(String),

    #[error("Locks still active after {attempts} attempts: {locks:?}")]
    LocksStillActive { attempts: u32, locks: Vec<String> },

    #[error("Run cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CorecError {
    /// Build a [`CorecError::Format`] for the document at `path`.
    pub fn format(path: impl AsRef<Path>, message: impl ToString) -> Self {
        CorecError::Format {
            path: path.as_ref().display().to_string(),
            message: message.to_string(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CorecError>;
