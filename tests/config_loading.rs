// tests/config_loading.rs

use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::NamedTempFile;

use corec::config::{
    config_root_dir, default_config_path, load_and_validate, load_or_default, ConfigFile,
    RawConfigFile,
};
use corec::errors::CorecError;
use corec::types::FailurePolicy;

type TestResult = Result<(), Box<dyn Error>>;

fn config_file(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{contents}")?;
    Ok(file)
}

#[test]
fn test_missing_config_file_uses_defaults() -> TestResult {
    let dir = tempfile::tempdir()?;
    let cfg = load_or_default(dir.path().join("Corec.toml"))?;

    assert_eq!(cfg.config.pipeline, PathBuf::from("pipeline.json"));
    assert_eq!(cfg.config.parameters, PathBuf::from("corec_parameters.json"));
    assert_eq!(cfg.config.locks, PathBuf::from("corec_locks.json"));
    assert_eq!(cfg.config.progress, PathBuf::from("corec_progress.txt"));
    assert_eq!(cfg.config.on_script_failure, FailurePolicy::Abort);
    assert!(cfg.report.enabled);

    let policy = cfg.run_policy();
    assert!(!policy.mock);
    assert_eq!(policy.retry.max_attempts, Some(100));
    assert_eq!(policy.retry.initial_backoff, Duration::from_millis(100));
    assert_eq!(policy.retry.max_backoff, Duration::from_millis(5000));
    Ok(())
}

#[test]
fn test_sections_override_defaults() -> TestResult {
    let file = config_file(
        r#"
[config]
pipeline = "flows/main.json"
on_script_failure = "continue"
mock = true

[retry]
max_attempts = 0
initial_backoff_ms = 10
max_backoff_ms = 20

[report]
enabled = false
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.config.pipeline, PathBuf::from("flows/main.json"));
    assert_eq!(cfg.config.parameters, PathBuf::from("corec_parameters.json"));
    assert!(!cfg.report.enabled);
    assert_eq!(cfg.report.dir_prefix, "corec_report");

    let policy = cfg.run_policy();
    assert_eq!(policy.on_script_failure, FailurePolicy::Continue);
    assert!(policy.mock);
    assert_eq!(policy.retry.max_attempts, None);
    Ok(())
}

#[test]
fn test_shared_store_file_returns_config_error() -> TestResult {
    let file = config_file(
        r#"
[config]
parameters = "state.json"
locks = "state.json"
"#,
    )?;

    match load_and_validate(file.path()) {
        Err(CorecError::ConfigError(msg)) => {
            assert!(msg.contains("parameters"));
            assert!(msg.contains("locks"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    Ok(())
}

#[test]
fn test_inverted_backoff_returns_config_error() -> TestResult {
    let file = config_file(
        r#"
[retry]
initial_backoff_ms = 500
max_backoff_ms = 100
"#,
    )?;

    match load_and_validate(file.path()) {
        Err(CorecError::ConfigError(msg)) => assert!(msg.contains("max_backoff_ms")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
    Ok(())
}

#[test]
fn test_empty_report_prefix_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.report.dir_prefix = "  ".to_string();

    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(CorecError::ConfigError(_))
    ));
}

#[test]
fn test_empty_path_is_rejected() {
    let mut raw = RawConfigFile::default();
    raw.config.pipeline = PathBuf::new();

    match ConfigFile::try_from(raw) {
        Err(CorecError::ConfigError(msg)) => assert!(msg.contains("pipeline")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_unknown_failure_policy_is_toml_error() -> TestResult {
    let file = config_file(
        r#"
[config]
on_script_failure = "retry"
"#,
    )?;

    assert!(matches!(
        load_and_validate(file.path()),
        Err(CorecError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn test_failure_policy_from_str() {
    assert_eq!("Abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
    assert_eq!(" continue ".parse::<FailurePolicy>(), Ok(FailurePolicy::Continue));
    assert!("sometimes".parse::<FailurePolicy>().is_err());
}

#[test]
fn test_paths_resolve_against_config_directory() {
    let cfg = ConfigFile::default();
    let root = config_root_dir(Path::new("/srv/project/Corec.toml"));
    assert_eq!(root, PathBuf::from("/srv/project"));

    let resolved = cfg.config.resolved_against(&root);
    assert_eq!(resolved.pipeline, PathBuf::from("/srv/project/pipeline.json"));
    assert_eq!(resolved.script_dir, PathBuf::from("/srv/project/."));

    let mut absolute = cfg.config.clone();
    absolute.locks = PathBuf::from("/tmp/locks.json");
    assert_eq!(
        absolute.resolved_against(&root).locks,
        PathBuf::from("/tmp/locks.json")
    );

    assert_eq!(default_config_path(), PathBuf::from("Corec.toml"));
}
