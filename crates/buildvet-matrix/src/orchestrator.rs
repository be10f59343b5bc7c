//! Per-variant build orchestration.

use std::path::{Path, PathBuf};

use buildvet_core::{BuildVariant, Result};
use tracing::info;

use crate::backend::BuildBackend;
use crate::workspace::ScopedWorkspace;

/// Partial outcome of a successful build, before execution and parsing.
#[derive(Debug)]
pub struct BuildOutcome {
    /// Wall-clock duration of the build step in seconds.
    pub build_duration_s: f64,

    /// Workspace directory holding the built artifact.
    pub workspace_path: PathBuf,
}

/// Drives the backend through configure + compile for one variant.
pub struct BuildOrchestrator<'a> {
    backend: &'a dyn BuildBackend,
    workspace_root: &'a Path,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(backend: &'a dyn BuildBackend, workspace_root: &'a Path) -> Self {
        Self {
            backend,
            workspace_root,
        }
    }

    /// Build one variant in a freshly recreated workspace.
    ///
    /// The workspace is destroyed and recreated before the backend runs,
    /// so no stale state carries across builds. Backend failures are
    /// fatal for the variant and are not retried. The artifact's absence
    /// is not checked here; the runner surfaces it.
    pub async fn build(&self, variant: &BuildVariant) -> Result<BuildOutcome> {
        let workspace = ScopedWorkspace::acquire(self.workspace_root, &variant.workspace_id)?;

        self.backend.configure(variant, workspace.path()).await?;
        let duration = self.backend.compile(variant, workspace.path()).await?;

        info!(
            variant = %variant.workspace_id,
            build_duration_s = duration.as_secs_f64(),
            "build complete"
        );

        Ok(BuildOutcome {
            build_duration_s: duration.as_secs_f64(),
            workspace_path: workspace.path().to_path_buf(),
        })
    }
}
