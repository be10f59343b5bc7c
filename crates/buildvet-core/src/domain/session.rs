//! Validation session: the results collected in one invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::BuildResult;

/// A variant that reached a terminal failure instead of producing a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantFailure {
    /// Workspace id of the failed variant.
    pub variant: String,

    /// Pipeline stage that failed (configure, compile, run, parse).
    pub stage: String,

    /// Error rendered for the report.
    pub reason: String,
}

/// The set of build results collected for one invocation, plus the
/// optional externally supplied baseline fingerprint.
///
/// Each pipeline step returns its `BuildResult` and the session collects
/// them; there is no shared mutable accumulator behind the steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSession {
    /// Unique id for this invocation.
    pub session_id: Uuid,

    /// When the session started.
    pub started_at: DateTime<Utc>,

    /// Input payload passed to every artifact run, if any.
    pub input_payload: Option<String>,

    /// Externally supplied correctness baseline, if any.
    pub baseline_fingerprint: Option<String>,

    /// One result per variant that completed the pipeline.
    pub results: Vec<BuildResult>,

    /// Terminal per-variant failures (populated in collect-all mode).
    pub failures: Vec<VariantFailure>,
}

impl ValidationSession {
    /// Start a new session.
    pub fn new(input_payload: Option<String>, baseline_fingerprint: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            input_payload,
            baseline_fingerprint,
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Record a completed variant.
    pub fn record_result(&mut self, result: BuildResult) {
        self.results.push(result);
    }

    /// Record a terminal variant failure.
    pub fn record_failure(&mut self, failure: VariantFailure) {
        self.failures.push(failure);
    }

    /// Whether every attempted variant produced a result.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
