// src/report/mod.rs

//! Run report.
//!
//! The engine only ever pushes into a [`ReportSink`] and never looks at the
//! result. [`html::HtmlReport`] is the sink used by the CLI.

pub mod html;

use std::path::Path;

pub use html::HtmlReport;

/// Fire-and-forget report target. Implementations log their own failures.
pub trait ReportSink: Send {
    fn add_text(&mut self, text: &str);
    fn add_file(&mut self, path: &Path);
}

/// Discards everything (report disabled).
#[derive(Debug, Default)]
pub struct NullReport;

impl ReportSink for NullReport {
    fn add_text(&mut self, _text: &str) {}
    fn add_file(&mut self, _path: &Path) {}
}
