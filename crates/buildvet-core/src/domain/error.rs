//! Domain-level error taxonomy for buildvet.

use std::path::PathBuf;

/// The build-backend step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Workspace configuration (generator + cache entries).
    Configure,
    /// Artifact compilation.
    Compile,
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStage::Configure => write!(f, "configure"),
            BuildStage::Compile => write!(f, "compile"),
        }
    }
}

/// Buildvet domain errors.
///
/// Every variant except `Io` maps to one stage of the per-variant pipeline.
/// A regression verdict is not an error: it is captured in the report and
/// translated into a process exit status by the driver.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("invalid matrix configuration: {0}")]
    Configuration(String),

    #[error("{stage} step failed for variant {variant}: {diagnostics}")]
    Build {
        stage: BuildStage,
        variant: String,
        diagnostics: String,
    },

    #[error("artifact not found at expected path: {path}")]
    ArtifactNotFound { path: PathBuf },

    #[error("artifact exited with code {exit_code}: {stderr}")]
    Execution { exit_code: i32, stderr: String },

    #[error("artifact output missing mandatory key: {missing_key}")]
    Parse { missing_key: String },

    #[error("{operation} timed out after {timeout_secs}s for variant {variant}")]
    Timeout {
        operation: String,
        variant: String,
        timeout_secs: u64,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for buildvet domain operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
