// src/report/html.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::report::ReportSink;
use crate::types::short_uuid;

/// Parameter under which a full run records its report directory, so that
/// `corec report ...` calls made from step scripts find it.
pub const REPORT_DIR_PARAMETER: &str = "corec_report_dir";

const INDEX_FILE: &str = "index.html";
const CONTENT_MARKER: &str = "<!-- corec:content -->";

type Renderer = fn(&str) -> String;

/// Extension sets mapped to the markup used to embed a copied file.
/// `src` is the file name inside the report directory.
const EMBEDDERS: &[(&[&str], Renderer)] = &[
    (&["png", "jpg", "jpeg"], embed_image),
    (&["pdf"], embed_pdf),
    (&["html", "htm"], embed_html),
];

fn embed_image(src: &str) -> String {
    format!(r#"<img src="{}">"#, escape_html(src))
}

fn embed_pdf(src: &str) -> String {
    format!(
        r#"<embed src="{}" width="500" height="375" type="application/pdf">"#,
        escape_html(src)
    )
}

fn embed_html(src: &str) -> String {
    format!(
        r#"<iframe src="{}" width="100%" height="500"></iframe>"#,
        escape_html(src)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Single-page HTML report living in its own directory.
///
/// Fragments are inserted in front of a placeholder comment, which
/// [`HtmlReport::finalize`] removes.
#[derive(Debug, Clone)]
pub struct HtmlReport {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl HtmlReport {
    /// Create `<parent>/<prefix>_<id>/index.html`.
    pub fn create(fs: Arc<dyn FileSystem>, parent: &Path, prefix: &str) -> Result<Self> {
        let dir = parent.join(format!("{}_{}", prefix, short_uuid()));
        fs.create_dir_all(&dir)?;
        info!(dir = %dir.display(), "created report directory");

        let report = Self { fs, dir };
        let skeleton = format!("<!DOCTYPE html>\n<html>\n<body>\n{CONTENT_MARKER}\n</body>\n</html>\n");
        report.fs.write(&report.index_path(), skeleton.as_bytes())?;
        Ok(report)
    }

    /// Attach to an existing report directory.
    pub fn open(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Remove the placeholder. Returns the path of the finished page.
    pub fn finalize(&self) -> Result<PathBuf> {
        let index = self.index_path();
        let html = self.fs.read_to_string(&index)?;
        let done = html.replace(&format!("{CONTENT_MARKER}\n"), "");
        self.fs.write(&index, done.as_bytes())?;
        info!(path = %index.display(), "HTML report is available");
        Ok(index)
    }

    fn append(&self, fragment: &str) -> Result<()> {
        let index = self.index_path();
        let html = self.fs.read_to_string(&index)?;
        let updated = html.replacen(CONTENT_MARKER, &format!("{fragment}\n{CONTENT_MARKER}"), 1);
        self.fs.write(&index, updated.as_bytes())?;
        Ok(())
    }

    fn render_file(&self, path: &Path) -> Result<String> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.fs.copy(path, &self.dir.join(&name))?;

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if let Some((_, render)) = EMBEDDERS
            .iter()
            .find(|(extensions, _)| extensions.contains(&extension.as_str()))
        {
            return Ok(render(&name));
        }

        let bytes = self.fs.read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(format!(
            "<p>File: <a href=\"{0}\">{0}</a>:</p>\n<p><code>{1}</code></p>",
            escape_html(&name),
            escape_html(&text)
        ))
    }
}

impl ReportSink for HtmlReport {
    fn add_text(&mut self, text: &str) {
        match self.append(&format!("<p>{}</p>", escape_html(text))) {
            Ok(()) => info!("added to report: {}", text),
            Err(err) => warn!(error = %err, "failed to add text to report"),
        }
    }

    fn add_file(&mut self, path: &Path) {
        let added = self
            .render_file(path)
            .and_then(|fragment| self.append(&fragment));
        match added {
            Ok(()) => info!(file = %path.display(), "added file to report"),
            Err(err) => warn!(file = %path.display(), error = %err, "failed to add file to report"),
        }
    }
}
