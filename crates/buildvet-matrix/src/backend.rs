//! Build-backend abstraction and the CMake implementation.
//!
//! The backend contract: a configuration step prepares the workspace, a
//! build step produces the artifact at a conventional path inside it.
//! Non-zero exit from either step is fatal for the variant; there is no
//! partial-success state and no retry.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use buildvet_core::{BuildStage, BuildVariant, MatrixError, Result};
use tracing::info;

use crate::exec::{run_command, ExecOutcome};

/// External build toolchain invoked once per variant.
#[async_trait]
pub trait BuildBackend: Send + Sync {
    /// Prepare the workspace for the variant's configuration.
    async fn configure(&self, variant: &BuildVariant, workspace: &Path) -> Result<()>;

    /// Compile the artifact, returning the wall-clock build duration.
    ///
    /// Only this step is timed; configuration time is not part of the
    /// build-duration metric.
    async fn compile(&self, variant: &BuildVariant, workspace: &Path) -> Result<Duration>;
}

/// CMake-driven backend: `cmake -G <generator> ...` then `make`/`ninja`.
pub struct CmakeBackend {
    source_dir: PathBuf,
    timeout_secs: u64,
}

impl CmakeBackend {
    /// Create a backend for the project at `source_dir`.
    pub fn new(source_dir: PathBuf, timeout_secs: u64) -> Self {
        Self {
            source_dir,
            timeout_secs,
        }
    }

    fn configure_args(&self, variant: &BuildVariant, source: &Path) -> Vec<String> {
        let mut args = vec![
            "-G".to_string(),
            variant.generator.cmake_name().to_string(),
            format!("-DCMAKE_CXX_FLAGS={}", variant.opt_flag),
        ];
        for (key, value) in &variant.features {
            args.push(format!("-D{key}={value}"));
        }
        args.push(source.display().to_string());
        args
    }
}

#[async_trait]
impl BuildBackend for CmakeBackend {
    async fn configure(&self, variant: &BuildVariant, workspace: &Path) -> Result<()> {
        // The configure step runs inside the workspace, so the source path
        // must be absolute.
        let source = self.source_dir.canonicalize()?;
        let args = self.configure_args(variant, &source);

        info!(variant = %variant.workspace_id, "configuring");

        match run_command("cmake", &args, Some(workspace), self.timeout_secs).await? {
            ExecOutcome::Completed(output) if output.success() => Ok(()),
            ExecOutcome::Completed(output) => Err(MatrixError::Build {
                stage: BuildStage::Configure,
                variant: variant.workspace_id.clone(),
                diagnostics: output.diagnostics(),
            }),
            ExecOutcome::TimedOut => Err(MatrixError::Timeout {
                operation: "configure".to_string(),
                variant: variant.workspace_id.clone(),
                timeout_secs: self.timeout_secs,
            }),
        }
    }

    async fn compile(&self, variant: &BuildVariant, workspace: &Path) -> Result<Duration> {
        let program = variant.generator.build_program();

        info!(variant = %variant.workspace_id, program, "building");

        let start = Instant::now();
        match run_command(program, &[], Some(workspace), self.timeout_secs).await? {
            ExecOutcome::Completed(output) if output.success() => Ok(start.elapsed()),
            ExecOutcome::Completed(output) => Err(MatrixError::Build {
                stage: BuildStage::Compile,
                variant: variant.workspace_id.clone(),
                diagnostics: output.diagnostics(),
            }),
            ExecOutcome::TimedOut => Err(MatrixError::Timeout {
                operation: "compile".to_string(),
                variant: variant.workspace_id.clone(),
                timeout_secs: self.timeout_secs,
            }),
        }
    }
}
