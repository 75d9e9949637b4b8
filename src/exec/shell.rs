// src/exec/shell.rs

//! Runs step/tool scripts with `bash`, streaming their output into the log.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::backend::{CommandExecutor, ScriptJob, ScriptOutcome};
use crate::store::ProgressTrail;

/// Prepended to every script so it stops on the first failing command.
pub const SCRIPT_PREAMBLE: &str = "set -e\n\n";

/// Production executor.
///
/// Each job is saved as `<script_dir>/<job.name>` and run as
/// `bash <file>` from `working_dir`. Stdout lines are logged as they arrive,
/// prefixed with the current progress trail; stderr is logged at debug.
/// Both are also captured in the returned [`ScriptOutcome`].
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    script_dir: PathBuf,
    working_dir: PathBuf,
    env: Vec<(String, OsString)>,
    progress: Option<ProgressTrail>,
}

impl ShellExecutor {
    pub fn new(script_dir: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            script_dir: script_dir.into(),
            working_dir: working_dir.into(),
            env: Vec::new(),
            progress: None,
        }
    }

    /// Export an extra environment variable to every script.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Use `trail` to label streamed output lines.
    pub fn with_progress(mut self, trail: ProgressTrail) -> Self {
        self.progress = Some(trail);
        self
    }
}

impl CommandExecutor for ShellExecutor {
    fn run(
        &mut self,
        job: ScriptJob,
    ) -> Pin<Box<dyn Future<Output = Result<ScriptOutcome>> + Send + '_>> {
        let this = self.clone();
        Box::pin(async move { this.run_script(job).await })
    }
}

impl ShellExecutor {
    async fn run_script(self, job: ScriptJob) -> Result<ScriptOutcome> {
        let path = self.script_dir.join(&job.name);
        info!(script = %path.display(), node = %job.node, "saving bash commands");

        tokio::fs::create_dir_all(&self.script_dir)
            .await
            .with_context(|| format!("creating script dir {:?}", self.script_dir))?;
        tokio::fs::write(&path, format!("{SCRIPT_PREAMBLE}{}", job.script))
            .await
            .with_context(|| format!("writing script {:?}", path))?;

        let label = match &self.progress {
            Some(trail) => trail.read().unwrap_or_default(),
            None => String::new(),
        };

        info!(command = %format!("bash {}", path.display()), "running");

        let mut cmd = Command::new("bash");
        cmd.arg(&path)
            .current_dir(&self.working_dir)
            .envs(self.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning bash for '{}'", job.node))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Drain stderr concurrently so the pipe never fills up.
        let stderr_task = tokio::spawn({
            let node = job.node.clone();
            async move {
                let mut captured = String::new();
                if let Some(stderr) = stderr {
                    let mut reader = BufReader::new(stderr);
                    let mut buf = Vec::new();
                    loop {
                        buf.clear();
                        match reader.read_until(b'\n', &mut buf).await {
                            Ok(0) => break,
                            Ok(_) => {
                                let line = decode_line(&buf);
                                debug!(node = %node, "stderr: {}", line);
                                captured.push_str(&line);
                                captured.push('\n');
                            }
                            Err(err) => {
                                warn!(node = %node, error = %err, "stopped reading stderr");
                                break;
                            }
                        }
                    }
                }
                captured
            }
        });

        let mut captured_stdout = String::new();
        if let Some(stdout) = stdout {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                let read = reader
                    .read_until(b'\n', &mut buf)
                    .await
                    .with_context(|| format!("reading stdout of '{}'", job.node))?;
                if read == 0 {
                    break;
                }
                let line = decode_line(&buf);
                info!("{} --> {} -> {}", label, job.name, line);
                captured_stdout.push_str(&line);
                captured_stdout.push('\n');
            }
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for script of '{}'", job.node))?;

        let captured_stderr = stderr_task.await.unwrap_or_else(|err| {
            warn!(node = %job.node, error = %err, "stderr reader task failed");
            String::new()
        });

        let exit_code = status.code().unwrap_or(-1);
        info!(script = %path.display(), exit_code, "script exited");

        Ok(ScriptOutcome {
            exit_code,
            stdout: captured_stdout,
            stderr: captured_stderr,
        })
    }
}

/// One output line without its terminator. Bytes that are not UTF-8 are
/// replaced rather than failing the read.
fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

/// `PATH` for scripts: the current `PATH` plus the directory holding the
/// running `corec` binary and the project root, so scripts can call
/// `corec set ...` and project-local helpers.
pub fn script_path_env(project_root: &Path) -> OsString {
    let mut dirs: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default();

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    for extra in exe_dir.into_iter().chain([project_root.to_path_buf()]) {
        if !dirs.contains(&extra) {
            dirs.push(extra);
        }
    }

    std::env::join_paths(dirs).unwrap_or_else(|_| std::env::var_os("PATH").unwrap_or_default())
}
