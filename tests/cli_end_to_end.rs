// tests/cli_end_to_end.rs
//
// Drives the real binary: scripts run under bash and call back into
// `corec` through PATH and COREC_CONFIG.
#![cfg(unix)]

mod common;
use crate::common::PipelineBuilder;

use std::error::Error;
use std::path::Path;
use std::process::{Command, Output, Stdio};

type TestResult = Result<(), Box<dyn Error>>;

fn corec(project: &Path, args: &[&str]) -> Result<Output, Box<dyn Error>> {
    let output = Command::new(env!("CARGO_BIN_EXE_corec"))
        .arg("--config")
        .arg(project.join("Corec.toml"))
        .args(args)
        .env_remove("COREC_CONFIG")
        .env("COREC_LOG", "warn")
        .current_dir(project)
        .stdin(Stdio::null())
        .output()?;
    Ok(output)
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn write_project(dir: &Path, pipeline: &PipelineBuilder, config: &str) -> TestResult {
    std::fs::write(dir.join("pipeline.json"), pipeline.to_json())?;
    std::fs::write(dir.join("Corec.toml"), config)?;
    Ok(())
}

#[test]
fn test_full_run_through_bash() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new()
        .parameter("P1")
        .step(
            "S1",
            "corec set O1 \"$(corec get P1)-done\"\ncorec report \"S1 finished\"\necho progress: $(corec progress)",
        )
        .output("O1")
        .needs("S1", "P1")
        .sets("S1", "O1");
    write_project(dir.path(), &pipeline, "[config]\nscript_dir = \"scripts\"\n")?;

    let set = corec(dir.path(), &["set", "P1", "hello"])?;
    assert!(set.status.success(), "set failed: {:?}", set);

    let init = corec(dir.path(), &["init"])?;
    assert!(
        init.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&init.stderr)
    );

    let get = corec(dir.path(), &["get", "O1"])?;
    assert_eq!(stdout_of(&get), "hello-done");

    // One generated script, kept for inspection.
    let scripts: Vec<String> = std::fs::read_dir(dir.path().join("scripts"))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].starts_with("step_S1_"));
    let body = std::fs::read_to_string(dir.path().join("scripts").join(&scripts[0]))?;
    assert!(body.starts_with("set -e\n"));

    // The run's report picked up the line added from inside the script.
    let report_dir = stdout_of(&corec(dir.path(), &["get", "corec_report_dir"])?);
    let index = std::fs::read_to_string(Path::new(&report_dir).join("index.html"))?;
    assert!(index.contains("<p>S1 finished</p>"));
    assert!(!index.contains("corec:content"));

    // Trail is empty once the run is over.
    assert_eq!(stdout_of(&corec(dir.path(), &["progress"])?), "");
    Ok(())
}

#[test]
fn test_failing_script_fails_the_command() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new()
        .step("S1", "false\ncorec set O1 unreachable")
        .output("O1")
        .sets("S1", "O1");
    write_project(dir.path(), &pipeline, "[report]\nenabled = false\n")?;

    let init = corec(dir.path(), &["init"])?;
    assert!(!init.status.success());
    assert!(String::from_utf8_lossy(&init.stderr).contains("exited with code 1"));

    assert_eq!(stdout_of(&corec(dir.path(), &["get", "O1"])?), "COREC_UNSET");
    Ok(())
}

#[test]
fn test_ignore_return_code_keeps_going() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new()
        .step("S1", "corec set O1 partial\nexit 4")
        .output("O1")
        .sets("S1", "O1");
    write_project(dir.path(), &pipeline, "[report]\nenabled = false\n")?;

    let init = corec(dir.path(), &["init", "--ignore-return-code"])?;
    assert!(init.status.success());
    assert_eq!(stdout_of(&corec(dir.path(), &["get", "O1"])?), "partial");
    Ok(())
}

#[test]
fn test_store_commands() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), &PipelineBuilder::new(), "")?;

    assert_eq!(stdout_of(&corec(dir.path(), &["get", "nothing"])?), "COREC_UNSET");

    corec(dir.path(), &["set", "a", "1"])?;
    let merged = corec(dir.path(), &["set", "--merge", "a", "b"])?;
    assert!(merged.status.success());
    assert_eq!(stdout_of(&corec(dir.path(), &["get", "b"])?), "1");

    let bad_merge = corec(dir.path(), &["set", "--merge", "missing", "c"])?;
    assert!(!bad_merge.status.success());

    corec(dir.path(), &["lock", "download"])?;
    corec(dir.path(), &["lock", "index"])?;
    corec(dir.path(), &["unlock", "download"])?;
    assert_eq!(stdout_of(&corec(dir.path(), &["locks"])?), "index");
    Ok(())
}

#[test]
fn test_check_lists_pipeline_without_running() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = common::chain_pipeline();
    write_project(dir.path(), &pipeline, "")?;

    let check = corec(dir.path(), &["check"])?;
    assert!(check.status.success());

    let out = String::from_utf8_lossy(&check.stdout);
    assert!(out.contains("input parameters (1):"));
    assert!(out.contains("after: A"));
    assert!(!dir.path().join("corec_parameters.json").exists());
    Ok(())
}

#[test]
fn test_report_command_without_a_report() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new()
        .step("S1", "corec report \"hello\"\ncorec set O1 done")
        .output("O1")
        .sets("S1", "O1");
    write_project(dir.path(), &pipeline, "[report]\nenabled = false\n")?;

    let init = corec(dir.path(), &["init"])?;
    assert!(
        init.status.success(),
        "init failed: {}",
        String::from_utf8_lossy(&init.stderr)
    );
    assert_eq!(stdout_of(&corec(dir.path(), &["get", "O1"])?), "done");
    assert_eq!(stdout_of(&corec(dir.path(), &["get", "corec_report_dir"])?), "");
    Ok(())
}

#[test]
fn test_disabled_report_hides_the_previous_one() -> TestResult {
    let dir = tempfile::tempdir()?;
    let pipeline = PipelineBuilder::new()
        .step("S1", "corec report first\ncorec set O1 done")
        .output("O1")
        .sets("S1", "O1");
    write_project(dir.path(), &pipeline, "")?;

    assert!(corec(dir.path(), &["init"])?.status.success());
    let old_dir = stdout_of(&corec(dir.path(), &["get", "corec_report_dir"])?);
    let old_index = Path::new(&old_dir).join("index.html");
    assert!(std::fs::read_to_string(&old_index)?.contains("<p>first</p>"));

    std::fs::write(dir.path().join("Corec.toml"), "[report]\nenabled = false\n")?;
    assert!(corec(dir.path(), &["init"])?.status.success());
    assert_eq!(stdout_of(&corec(dir.path(), &["get", "corec_report_dir"])?), "");

    let late = corec(dir.path(), &["report", "late"])?;
    assert!(late.status.success());
    assert!(!std::fs::read_to_string(&old_index)?.contains("late"));
    Ok(())
}

#[test]
fn test_logs_are_plain_text_when_piped() -> TestResult {
    let dir = tempfile::tempdir()?;
    write_project(dir.path(), &PipelineBuilder::new(), "")?;

    let set = corec(dir.path(), &["--log-level", "debug", "set", "a", "1"])?;
    assert!(set.status.success());
    let stderr = String::from_utf8_lossy(&set.stderr);
    assert!(stderr.contains("workspace opened"), "no logs: {stderr}");
    assert!(!stderr.contains('\u{1b}'));
    Ok(())
}
