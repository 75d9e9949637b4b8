use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// What to do when a step or tool script exits with a non-zero code.
///
/// - `Abort`: stop the whole run immediately (default, "fail fast").
/// - `Continue`: log and report the failure, then carry on as though the
///   script had succeeded. Values already stored by the script are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    Abort,
    Continue,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Abort
    }
}

impl FailurePolicy {
    pub fn is_fail_fast(self) -> bool {
        self == FailurePolicy::Abort
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(format!(
                "invalid on_script_failure: {other} (expected \"abort\" or \"continue\")"
            )),
        }
    }
}

/// How the output-satisfaction loop waits for active locks to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` polls forever.
    pub max_attempts: Option<u32>,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based): doubles from
    /// `initial_backoff` and saturates at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    /// Whether `attempts` retries have used up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        matches!(self.max_attempts, Some(max) if attempts >= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(100),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

/// Run-wide policy handed to the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunPolicy {
    pub on_script_failure: FailurePolicy,
    /// Skip every step/tool action (dry run).
    pub mock: bool,
    pub retry: RetryPolicy,
}

/// Last group of a random v4 UUID (12 hex chars), used to make generated
/// script and report names unique.
pub fn short_uuid() -> String {
    let id = uuid::Uuid::new_v4().to_string();
    id.rsplit('-').next().unwrap_or_default().to_string()
}
