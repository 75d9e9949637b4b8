// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::types::{FailurePolicy, RetryPolicy, RunPolicy};

/// Configuration as read from `Corec.toml`, before validation.
///
/// ```toml
/// [config]
/// pipeline = "pipeline.json"
/// on_script_failure = "continue"
///
/// [retry]
/// max_attempts = 0   # poll forever
///
/// [report]
/// enabled = false
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default)]
    pub report: ReportSection,
}

/// Validated configuration. Construct through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub retry: RetrySection,
    pub report: ReportSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        retry: RetrySection,
        report: ReportSection,
    ) -> Self {
        Self {
            config,
            retry,
            report,
        }
    }

    /// Run policy for the engine.
    pub fn run_policy(&self) -> RunPolicy {
        RunPolicy {
            on_script_failure: self.config.on_script_failure,
            mock: self.config.mock,
            retry: self.retry.policy(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.config, raw.retry, raw.report)
    }
}

/// `[config]` section: file locations and run behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    #[serde(default = "default_pipeline")]
    pub pipeline: PathBuf,

    #[serde(default = "default_parameters")]
    pub parameters: PathBuf,

    #[serde(default = "default_locks")]
    pub locks: PathBuf,

    #[serde(default = "default_progress")]
    pub progress: PathBuf,

    /// Where generated `step_*.sh` / `tool_*.sh` files are written.
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,

    /// `"abort"` (default) or `"continue"`.
    #[serde(default)]
    pub on_script_failure: FailurePolicy,

    #[serde(default)]
    pub mock: bool,
}

fn default_pipeline() -> PathBuf {
    PathBuf::from("pipeline.json")
}

fn default_parameters() -> PathBuf {
    PathBuf::from("corec_parameters.json")
}

fn default_locks() -> PathBuf {
    PathBuf::from("corec_locks.json")
}

fn default_progress() -> PathBuf {
    PathBuf::from("corec_progress.txt")
}

fn default_script_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            pipeline: default_pipeline(),
            parameters: default_parameters(),
            locks: default_locks(),
            progress: default_progress(),
            script_dir: default_script_dir(),
            on_script_failure: FailurePolicy::default(),
            mock: false,
        }
    }
}

impl ConfigSection {
    /// Same section with every relative path anchored at `root`.
    pub fn resolved_against(&self, root: &Path) -> Self {
        let anchor = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        };
        Self {
            pipeline: anchor(&self.pipeline),
            parameters: anchor(&self.parameters),
            locks: anchor(&self.locks),
            progress: anchor(&self.progress),
            script_dir: anchor(&self.script_dir),
            ..self.clone()
        }
    }
}

/// `[retry]` section: how long to wait for advisory locks to clear.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Number of retries before giving up; `0` polls forever.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    100
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_max_backoff_ms() -> u64 {
    5000
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetrySection {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: (self.max_attempts > 0).then_some(self.max_attempts),
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    #[serde(default = "default_report_enabled")]
    pub enabled: bool,

    #[serde(default = "default_dir_prefix")]
    pub dir_prefix: String,
}

fn default_report_enabled() -> bool {
    true
}

fn default_dir_prefix() -> String {
    "corec_report".to_string()
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            enabled: default_report_enabled(),
            dir_prefix: default_dir_prefix(),
        }
    }
}
