// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CorecError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CorecError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.retry, raw.report))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_distinct_stores(cfg)?;
    validate_retry(cfg)?;
    validate_report(cfg)?;
    Ok(())
}

fn ensure_non_empty(key: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(CorecError::ConfigError(format!(
            "[config].{key} must not be empty"
        )));
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.config;
    ensure_non_empty("pipeline", &c.pipeline)?;
    ensure_non_empty("parameters", &c.parameters)?;
    ensure_non_empty("locks", &c.locks)?;
    ensure_non_empty("progress", &c.progress)?;
    ensure_non_empty("script_dir", &c.script_dir)?;
    Ok(())
}

fn validate_distinct_stores(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.config;
    let stores = [
        ("parameters", &c.parameters),
        ("locks", &c.locks),
        ("progress", &c.progress),
    ];

    for (i, (name_a, path_a)) in stores.iter().enumerate() {
        for (name_b, path_b) in stores.iter().skip(i + 1) {
            if path_a == path_b {
                return Err(CorecError::ConfigError(format!(
                    "[config].{} and [config].{} point to the same file {:?}",
                    name_a, name_b, path_a
                )));
            }
        }
    }
    Ok(())
}

fn validate_retry(cfg: &RawConfigFile) -> Result<()> {
    let r = &cfg.retry;
    if r.max_backoff_ms < r.initial_backoff_ms {
        return Err(CorecError::ConfigError(format!(
            "[retry].max_backoff_ms ({}) must be >= initial_backoff_ms ({})",
            r.max_backoff_ms, r.initial_backoff_ms
        )));
    }
    Ok(())
}

fn validate_report(cfg: &RawConfigFile) -> Result<()> {
    if cfg.report.dir_prefix.trim().is_empty() {
        return Err(CorecError::ConfigError(
            "[report].dir_prefix must not be empty".to_string(),
        ));
    }
    Ok(())
}
