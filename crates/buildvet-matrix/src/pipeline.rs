//! Sequential validation pipeline across the expanded matrix.
//!
//! Each variant walks the state machine
//! `Pending → Configured → Built → Executed → Parsed → Done`, with any
//! step able to land in `Failed`. Steps return their values; the session
//! collects them. Regression analysis runs only after every contributing
//! result has been collected.

use std::path::PathBuf;

use buildvet_core::{
    BuildResult, BuildStage, BuildVariant, ExecutionStatus, MatrixError, Result,
    ValidationSession, VariantFailure, VariantState,
};
use tracing::{error, info};

use crate::analyzer::{RegressionAnalyzer, RegressionConfig};
use crate::backend::BuildBackend;
use crate::metrics;
use crate::orchestrator::BuildOrchestrator;
use crate::report::ValidationReport;
use crate::runner::{ArtifactRunner, DEFAULT_ARTIFACT_NAME};
use crate::size;

/// What to do when a variant reaches a terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the whole session on the first failed variant (base behavior).
    FailFast,
    /// Record the failure and continue with the remaining variants.
    CollectAll,
}

/// Driver options for one session.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root directory holding the per-variant workspaces.
    pub workspace_root: PathBuf,

    /// Artifact filename expected at the workspace root after a build.
    pub artifact_name: String,

    /// Optional payload passed to every artifact run.
    pub input_payload: Option<String>,

    /// Optional externally supplied correctness baseline.
    pub baseline_fingerprint: Option<String>,

    /// Regression thresholds.
    pub regression: RegressionConfig,

    /// Failure policy, decided by the driver.
    pub failure_policy: FailurePolicy,

    /// Bound on artifact execution, in seconds (0 disables).
    pub run_timeout_secs: u64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("build-matrix"),
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            input_payload: None,
            baseline_fingerprint: None,
            regression: RegressionConfig::default(),
            failure_policy: FailurePolicy::FailFast,
            run_timeout_secs: 600,
        }
    }
}

/// Completed session plus its report.
#[derive(Debug)]
pub struct SessionOutcome {
    pub session: ValidationSession,
    pub report: ValidationReport,
}

/// Sequential matrix validation driver.
pub struct MatrixPipeline;

impl MatrixPipeline {
    /// Validate every variant, then analyze and assemble the report.
    ///
    /// Strictly sequential: each variant runs to completion before the
    /// next starts. Under `FailurePolicy::FailFast` the first terminal
    /// variant failure aborts the session with that error; under
    /// `CollectAll` it is recorded and the session completes.
    pub async fn run(
        backend: &dyn BuildBackend,
        variants: &[BuildVariant],
        options: &PipelineOptions,
    ) -> Result<SessionOutcome> {
        options.regression.validate()?;

        let mut session = ValidationSession::new(
            options.input_payload.clone(),
            options.baseline_fingerprint.clone(),
        );

        info!(
            session = %session.session_id,
            variants = variants.len(),
            "starting validation session"
        );

        for variant in variants {
            match Self::run_variant(backend, variant, options).await {
                Ok(result) => session.record_result(result),
                Err(e) => {
                    error!(variant = %variant.workspace_id, error = %e, "variant failed");
                    match options.failure_policy {
                        FailurePolicy::FailFast => return Err(e),
                        FailurePolicy::CollectAll => session.record_failure(VariantFailure {
                            variant: variant.workspace_id.clone(),
                            stage: failure_stage(&e).to_string(),
                            reason: e.to_string(),
                        }),
                    }
                }
            }
        }

        let verdict = RegressionAnalyzer::analyze(
            &session.results,
            session.baseline_fingerprint.as_deref(),
            &options.regression,
        )?;

        let report = ValidationReport::generate(&session, verdict);
        Ok(SessionOutcome { session, report })
    }

    /// Drive one variant through the full state machine.
    async fn run_variant(
        backend: &dyn BuildBackend,
        variant: &BuildVariant,
        options: &PipelineOptions,
    ) -> Result<BuildResult> {
        let mut state = VariantState::Pending;

        let orchestrator = BuildOrchestrator::new(backend, &options.workspace_root);
        let outcome = match orchestrator.build(variant).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Configure succeeded when the failure came from the
                // compile step; reflect that in the recorded transitions.
                if matches!(
                    e,
                    MatrixError::Build {
                        stage: BuildStage::Compile,
                        ..
                    }
                ) {
                    advance(variant, &mut state, VariantState::Configured);
                }
                fail(variant, &mut state, &e);
                return Err(e);
            }
        };
        advance(variant, &mut state, VariantState::Configured);
        advance(variant, &mut state, VariantState::Built);

        let runner = ArtifactRunner::new(&options.artifact_name, options.run_timeout_secs);
        let stdout = match runner
            .run(&outcome.workspace_path, options.input_payload.as_deref())
            .await
        {
            Ok(stdout) => stdout,
            Err(e) => {
                fail(variant, &mut state, &e);
                return Err(e);
            }
        };
        advance(variant, &mut state, VariantState::Executed);

        let metrics = match metrics::extract(&stdout) {
            Ok(metrics) => metrics,
            Err(e) => {
                fail(variant, &mut state, &e);
                return Err(e);
            }
        };
        advance(variant, &mut state, VariantState::Parsed);

        // Prefer the external inspection; fall back to the artifact's own
        // report when the utility is unavailable.
        let inspected = size::inspect_code_size(&outcome.workspace_path, &options.artifact_name).await;
        let code_size_bytes = if inspected > 0 {
            inspected
        } else {
            metrics.code_size_bytes.unwrap_or(0)
        };

        advance(variant, &mut state, VariantState::Done);

        Ok(BuildResult {
            variant: variant.clone(),
            build_duration_s: outcome.build_duration_s,
            code_size_bytes,
            fingerprint: metrics.fingerprint,
            run_time_ms: metrics.run_time_ms.unwrap_or(0),
            status: ExecutionStatus::Succeeded,
        })
    }
}

/// Map an error to the pipeline stage it belongs to, for failure records.
fn failure_stage(error: &MatrixError) -> &'static str {
    match error {
        MatrixError::Configuration(_) => "configuration",
        MatrixError::Build {
            stage: BuildStage::Configure,
            ..
        } => "configure",
        MatrixError::Build {
            stage: BuildStage::Compile,
            ..
        } => "compile",
        MatrixError::ArtifactNotFound { .. } | MatrixError::Execution { .. } => "run",
        MatrixError::Parse { .. } => "parse",
        MatrixError::Timeout { operation, .. } => {
            if operation.contains("artifact") {
                "run"
            } else {
                "build"
            }
        }
        MatrixError::Serialization(_) => "report",
        MatrixError::Io(_) => "workspace",
    }
}

fn advance(variant: &BuildVariant, state: &mut VariantState, next: VariantState) {
    debug_assert!(
        state.can_transition_to(&next),
        "illegal transition {state:?} -> {next:?}"
    );
    info!(variant = %variant.workspace_id, from = ?state, to = ?next, "state transition");
    *state = next;
}

fn fail(variant: &BuildVariant, state: &mut VariantState, error: &MatrixError) {
    let next = VariantState::Failed {
        reason: error.to_string(),
    };
    info!(variant = %variant.workspace_id, from = ?state, "variant failed");
    *state = next;
}
