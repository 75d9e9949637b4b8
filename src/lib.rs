// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod graph;
pub mod logging;
pub mod report;
pub mod store;
pub mod types;
pub mod workspace;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::{ConfigFile, config_root_dir, load_or_default};
use crate::engine::{Collaborators, Engine};
use crate::exec::shell::script_path_env;
use crate::exec::{ShellExecutor, StdinPrompt};
use crate::fs::RealFileSystem;
use crate::graph::validate::{dangling_references, find_step_cycle};
use crate::graph::{Graph, NodeKind, step_dependencies};
use crate::report::html::REPORT_DIR_PARAMETER;
use crate::report::{HtmlReport, NullReport, ReportSink};
use crate::types::FailurePolicy;
use crate::workspace::Workspace;

/// Value printed by `corec get` for a parameter that is not stored.
pub const UNSET_MARKER: &str = "COREC_UNSET";

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the durable stores
/// - the resolution engine and its collaborators
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = absolute(Path::new(&args.config));
    let cfg = load_or_default(&config_path)?;
    let root = config_root_dir(&config_path);
    let ws = Workspace::open(Arc::new(RealFileSystem), &cfg, root);
    debug!(root = %ws.root.display(), config = %config_path.display(), "workspace opened");

    match args.command {
        Command::Init {
            mock,
            ignore_return_code,
        } => run_init(&ws, &cfg, &config_path, mock, ignore_return_code).await,
        Command::Step { id } => run_step(&ws, &cfg, &config_path, &id).await,
        Command::Requires { tool } => run_requires(&ws, &cfg, &config_path, &tool).await,
        Command::Set {
            parameter,
            value,
            merge,
        } => {
            if merge {
                ws.params.merge_into(&parameter, &value)?;
            } else {
                ws.params.set(&parameter, &value)?;
            }
            Ok(())
        }
        Command::Get { parameter } => {
            let value = ws.params.get(&parameter)?;
            println!("{}", value.as_deref().unwrap_or(UNSET_MARKER));
            Ok(())
        }
        Command::Lock { name } => Ok(ws.locks.acquire(&name)?),
        Command::Unlock { name } => Ok(ws.locks.release(&name)?),
        Command::Locks => {
            for name in ws.locks.list_active()? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Progress => {
            println!("{}", ws.progress.read()?);
            Ok(())
        }
        Command::Report { content } => add_to_report(&ws, &cfg, &content),
        Command::Check => {
            let graph = ws.load_graph()?;
            print_check(&ws, &graph)
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn run_init(
    ws: &Workspace,
    cfg: &ConfigFile,
    config_path: &Path,
    mock: bool,
    ignore_return_code: bool,
) -> Result<()> {
    let mut policy = cfg.run_policy();
    if mock {
        policy.mock = true;
    }
    if ignore_return_code {
        info!("ignoring non-zero return codes");
        policy.on_script_failure = FailurePolicy::Continue;
    }

    let graph = ws.load_graph()?;

    // An empty directory tells nested `corec report` calls there is no
    // report for this run, hiding any left over from an earlier one.
    let report = if cfg.report.enabled {
        let report = HtmlReport::create(Arc::clone(&ws.fs), &ws.root, &cfg.report.dir_prefix)?;
        ws.params
            .set(REPORT_DIR_PARAMETER, &report.dir().display().to_string())?;
        Some(report)
    } else {
        ws.params.set(REPORT_DIR_PARAMETER, "")?;
        None
    };
    let sink: Box<dyn ReportSink> = match &report {
        Some(report) => Box::new(report.clone()),
        None => Box::new(NullReport),
    };

    let mut engine = Engine::new(ws.context(&graph), collaborators(ws, config_path, sink), policy)
        .with_cancellation(shutdown_token());
    let summary = engine.run_pipeline().await?;

    if let Some(report) = report {
        report.finalize()?;
    }
    if !summary.all_set() && !policy.mock {
        warn!("some requested outputs are still not set");
    }
    Ok(())
}

async fn run_step(ws: &Workspace, cfg: &ConfigFile, config_path: &Path, id: &str) -> Result<()> {
    let graph = ws.load_graph()?;
    let step = graph.resolve_kind(id, NodeKind::Step)?;

    let sink = existing_report_sink(ws)?;
    let mut engine = Engine::new(ws.context(&graph), collaborators(ws, config_path, sink), cfg.run_policy());
    engine.execute_step_explicit(step).await?;
    Ok(())
}

async fn run_requires(ws: &Workspace, cfg: &ConfigFile, config_path: &Path, tool: &str) -> Result<()> {
    info!(tool, "satisfying requirement");
    let graph = ws.load_graph()?;
    let tool = graph.resolve_kind(tool, NodeKind::Tool)?;

    let sink = existing_report_sink(ws)?;
    let mut engine = Engine::new(ws.context(&graph), collaborators(ws, config_path, sink), cfg.run_policy());
    engine.install_tool(tool).await?;
    Ok(())
}

/// Production collaborators: bash scripts, stdin prompts, and `sink`.
fn collaborators(ws: &Workspace, config_path: &Path, sink: Box<dyn ReportSink>) -> Collaborators {
    let executor = ShellExecutor::new(&ws.settings.script_dir, &ws.root)
        .with_env("COREC_CONFIG", config_path.as_os_str())
        .with_env("PATH", script_path_env(&ws.root))
        .with_progress(ws.progress.clone());

    Collaborators {
        executor: Box::new(executor),
        input: Box::new(StdinPrompt),
        report: sink,
    }
}

fn existing_report_sink(ws: &Workspace) -> Result<Box<dyn ReportSink>> {
    Ok(match ws.current_report()? {
        Some(report) => Box::new(report),
        None => Box::new(NullReport),
    })
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        cancel.cancel();
    });
    token
}

/// Never fails for lack of a report: scripts run under `set -e` and must
/// keep working with `[report] enabled = false`.
fn add_to_report(ws: &Workspace, cfg: &ConfigFile, content: &str) -> Result<()> {
    let report = if cfg.report.enabled {
        ws.current_report()?
    } else {
        None
    };
    let Some(mut report) = report else {
        info!(content, "no active report; ignoring");
        return Ok(());
    };

    let path = Path::new(content);
    if ws.fs.is_file(path) {
        report.add_file(path);
    } else {
        report.add_text(content);
    }
    Ok(())
}

/// `corec check` output: the pipeline as corec understands it.
fn print_check(ws: &Workspace, graph: &Graph) -> Result<()> {
    println!("corec check");
    println!("  pipeline = {}", ws.pipeline_path().display());
    println!(
        "  nodes = {}, edges = {}",
        graph.nodes().len(),
        graph.edges().len()
    );
    println!();

    let inputs: Vec<&str> = graph.external_parameters().map(|n| n.id()).collect();
    println!("input parameters ({}):", inputs.len());
    for id in &inputs {
        println!("  - {id}");
    }

    let outputs: Vec<&str> = graph.requested_outputs().map(|n| n.id()).collect();
    println!("requested outputs ({}):", outputs.len());
    for id in &outputs {
        println!("  - {id}");
    }

    let steps: Vec<_> = graph.nodes_of_kind(NodeKind::Step).collect();
    println!("steps ({}):", steps.len());
    for step in steps {
        println!("  - {}", step.id());
        match step_dependencies(graph, step) {
            Ok(deps) => {
                for dep in deps {
                    println!("      after: {} (for {:?})", dep.step.id(), dep.needed_for);
                }
            }
            Err(err) => println!("      error: {err}"),
        }
    }

    let tools: Vec<&str> = graph.nodes_of_kind(NodeKind::Tool).map(|n| n.id()).collect();
    if !tools.is_empty() {
        println!("tools ({}):", tools.len());
        for id in &tools {
            println!("  - {id}");
        }
    }

    for missing in dangling_references(graph) {
        warn!(id = %missing, "edge references an unknown node");
    }

    match find_step_cycle(graph) {
        Ok(Some(step)) => warn!(step = %step, "step dependencies contain a cycle"),
        Ok(None) => {}
        Err(err) => warn!(error = %err, "could not analyse step dependencies"),
    }

    debug!("check complete (no execution)");
    Ok(())
}
