//! Scoped per-variant workspace directories.
//!
//! Each variant owns exactly one directory under the workspace root. A
//! workspace is destroyed and recreated from empty on every acquire, so no
//! incremental or stale state survives between builds.

use std::path::{Path, PathBuf};

use buildvet_core::Result;
use tracing::debug;

/// An exclusively owned, freshly created build directory.
#[derive(Debug)]
pub struct ScopedWorkspace {
    path: PathBuf,
}

impl ScopedWorkspace {
    /// Acquire a clean workspace for `id` under `root`.
    ///
    /// Any existing directory for the same id is deleted first. Safe to
    /// repeat: a second acquire simply recreates the directory.
    pub fn acquire(root: &Path, id: &str) -> Result<Self> {
        let path = root.join(id);
        if path.exists() {
            debug!(workspace = %path.display(), "removing stale workspace");
            std::fs::remove_dir_all(&path)?;
        }
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// The workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Remove every workspace directory under `root`, plus `root` itself.
///
/// Idempotent: invoking this twice leaves the same end state and the
/// second call succeeds even though nothing remains to remove.
pub fn cleanup_all(root: &Path) -> Result<()> {
    match std::fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Remove a report file if present. Idempotent like [`cleanup_all`].
pub fn cleanup_report(report_path: &Path) -> Result<()> {
    match std::fs::remove_file(report_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
