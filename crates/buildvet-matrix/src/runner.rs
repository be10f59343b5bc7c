//! Artifact execution.

use std::path::Path;

use buildvet_core::{MatrixError, Result};
use tracing::info;

use crate::exec::{run_command, ExecOutcome};

/// Conventional artifact filename produced by the backend at the
/// workspace root.
pub const DEFAULT_ARTIFACT_NAME: &str = "integrity_checker";

/// Executes the built artifact and captures its stdout.
pub struct ArtifactRunner {
    artifact_name: String,
    timeout_secs: u64,
}

impl ArtifactRunner {
    pub fn new(artifact_name: &str, timeout_secs: u64) -> Self {
        Self {
            artifact_name: artifact_name.to_string(),
            timeout_secs,
        }
    }

    /// Run the artifact in `workspace`, passing `payload` as the single
    /// argument when present.
    ///
    /// `None` means no argument at all — the artifact distinguishes
    /// "no input" from "empty input". Errors: the expected path missing,
    /// a non-zero exit, or expiry of the bounded wait.
    pub async fn run(&self, workspace: &Path, payload: Option<&str>) -> Result<String> {
        let artifact_path = workspace.join(&self.artifact_name);
        if !artifact_path.exists() {
            return Err(MatrixError::ArtifactNotFound {
                path: artifact_path,
            });
        }

        let args: Vec<String> = payload.map(|p| vec![p.to_string()]).unwrap_or_default();

        info!(artifact = %artifact_path.display(), "running artifact");

        // The workspace directory name is the variant's workspace id.
        let variant = workspace
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.artifact_name.clone());

        let program = artifact_path.display().to_string();
        match run_command(&program, &args, Some(workspace), self.timeout_secs).await? {
            ExecOutcome::Completed(output) if output.success() => Ok(output.stdout),
            ExecOutcome::Completed(output) => Err(MatrixError::Execution {
                exit_code: output.exit_code,
                stderr: output.diagnostics(),
            }),
            ExecOutcome::TimedOut => Err(MatrixError::Timeout {
                operation: "artifact execution".to_string(),
                variant,
                timeout_secs: self.timeout_secs,
            }),
        }
    }
}
