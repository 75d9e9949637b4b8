// src/workspace.rs

//! A project directory as seen by one `corec` invocation: resolved settings
//! plus handles on the durable stores.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigFile, ConfigSection};
use crate::engine::RunContext;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::graph::Graph;
use crate::report::HtmlReport;
use crate::report::html::REPORT_DIR_PARAMETER;
use crate::store::{LockSet, ParameterStore, ProgressTrail};

#[derive(Debug, Clone)]
pub struct Workspace {
    pub fs: Arc<dyn FileSystem>,
    /// Directory relative paths are anchored to; scripts run from here.
    pub root: PathBuf,
    /// `[config]` with every path resolved against `root`.
    pub settings: ConfigSection,
    pub params: ParameterStore,
    pub locks: LockSet,
    pub progress: ProgressTrail,
}

impl Workspace {
    pub fn open(fs: Arc<dyn FileSystem>, cfg: &ConfigFile, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let settings = cfg.config.resolved_against(&root);
        Self {
            params: ParameterStore::new(Arc::clone(&fs), settings.parameters.clone()),
            locks: LockSet::new(Arc::clone(&fs), settings.locks.clone()),
            progress: ProgressTrail::new(Arc::clone(&fs), settings.progress.clone()),
            fs,
            root,
            settings,
        }
    }

    pub fn pipeline_path(&self) -> &Path {
        &self.settings.pipeline
    }

    pub fn load_graph(&self) -> Result<Graph> {
        Graph::load(self.fs.as_ref(), &self.settings.pipeline)
    }

    pub fn context<'a>(&'a self, graph: &'a Graph) -> RunContext<'a> {
        RunContext {
            graph,
            params: &self.params,
            locks: &self.locks,
            progress: &self.progress,
        }
    }

    /// The report started by the last full run, if there is one on disk.
    ///
    /// A run with reporting disabled records an empty directory.
    pub fn current_report(&self) -> Result<Option<HtmlReport>> {
        let Some(dir) = self.params.get(REPORT_DIR_PARAMETER)? else {
            return Ok(None);
        };
        if dir.is_empty() {
            return Ok(None);
        }
        let report = HtmlReport::open(Arc::clone(&self.fs), dir);
        if !self.fs.is_file(&report.index_path()) {
            return Ok(None);
        }
        Ok(Some(report))
    }
}
