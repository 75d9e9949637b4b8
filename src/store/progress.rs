// src/store/progress.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{trace, warn};

use crate::errors::Result;
use crate::fs::FileSystem;

/// Separator written in front of every frame marker.
pub const FRAME_SEPARATOR: &str = " --> ";

/// On-disk mirror of the in-flight call stack, e.g.
/// ` --> STEP: report --> STEP: align`.
///
/// Only ever written for outside inspection (a stuck or crashed run).
#[derive(Debug, Clone)]
pub struct ProgressTrail {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl ProgressTrail {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current trail. A missing file is created empty.
    pub fn read(&self) -> Result<String> {
        if !self.fs.is_file(&self.path) {
            self.fs.write(&self.path, b"")?;
            return Ok(String::new());
        }
        Ok(self.fs.read_to_string(&self.path)?)
    }

    fn write(&self, contents: &str) -> Result<()> {
        self.fs.write(&self.path, contents.as_bytes())?;
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        self.write("")
    }

    /// Push `marker` onto the trail until the returned guard is released.
    pub fn enter_frame(&self, marker: impl AsRef<str>) -> Result<FrameGuard> {
        let snapshot = self.read()?;
        let entered = format!("{snapshot}{FRAME_SEPARATOR}{}", marker.as_ref());
        self.write(&entered)?;
        trace!(trail = %entered, "entered frame");
        Ok(FrameGuard {
            trail: self.clone(),
            snapshot: Some(snapshot),
        })
    }
}

/// Scope guard returned by [`ProgressTrail::enter_frame`].
///
/// Restores the trail to its pre-frame content when dropped, so the file is
/// unwound on error paths as well.
#[derive(Debug)]
#[must_use = "the frame is left as soon as the guard is dropped"]
pub struct FrameGuard {
    trail: ProgressTrail,
    snapshot: Option<String>,
}

impl FrameGuard {
    /// Leave the frame, surfacing any I/O error.
    pub fn leave(mut self) -> Result<()> {
        match self.snapshot.take() {
            Some(snapshot) => self.trail.write(&snapshot),
            None => Ok(()),
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            if let Err(err) = self.trail.write(&snapshot) {
                warn!(
                    path = %self.trail.path.display(),
                    error = %err,
                    "failed to restore progress trail"
                );
            }
        }
    }
}
