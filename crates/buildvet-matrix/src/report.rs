//! Report assembly, persistence, and text rendering.

use std::path::Path;

use buildvet_core::{
    BuildResult, CorrectnessVerdict, PerformanceVerdict, RegressionVerdict, Result,
    ValidationSession, VariantFailure,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known report path consumed by the external pipeline.
pub const REPORT_FILE_NAME: &str = "validation_report.json";

/// Per-variant section of the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantReport {
    /// Workspace id identifying the variant.
    pub variant: String,

    /// Generator / optimization label for human readers.
    pub configuration: String,

    pub build_duration_s: f64,
    pub code_size_bytes: u64,
    pub fingerprint: String,
    pub run_time_ms: u64,
}

impl VariantReport {
    fn from_result(result: &BuildResult) -> Self {
        Self {
            variant: result.variant.workspace_id.clone(),
            configuration: result.variant.label(),
            build_duration_s: result.build_duration_s,
            code_size_bytes: result.code_size_bytes,
            fingerprint: result.fingerprint.clone(),
            run_time_ms: result.run_time_ms,
        }
    }
}

/// Structured, persistable record of one validation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,

    /// Input payload passed to the artifact, if any.
    pub input_payload: Option<String>,

    /// Externally supplied baseline fingerprint, if any.
    pub baseline_fingerprint: Option<String>,

    /// Per-variant metrics in matrix order.
    pub variants: Vec<VariantReport>,

    /// Variants that failed before producing metrics (collect-all mode).
    pub failures: Vec<VariantFailure>,

    /// Derived regression verdict.
    pub verdict: RegressionVerdict,

    /// Overall gate: correctness passed, performance did not fail, and
    /// no variant terminally failed.
    pub success: bool,
}

impl ValidationReport {
    /// Assemble the report for a completed session.
    pub fn generate(session: &ValidationSession, verdict: RegressionVerdict) -> Self {
        let success = verdict.success() && session.is_complete();
        Self {
            session_id: session.session_id,
            created_at: Utc::now(),
            input_payload: session.input_payload.clone(),
            baseline_fingerprint: session.baseline_fingerprint.clone(),
            variants: session.results.iter().map(VariantReport::from_result).collect(),
            failures: session.failures.clone(),
            verdict,
            success,
        }
    }

    /// Persist the report as pretty-printed JSON. No side effects beyond
    /// the write.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Render the human-readable report.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Validation Report\n");
        out.push_str("=================\n");
        out.push_str(&format!("session: {}\n", self.session_id));
        if let Some(payload) = &self.input_payload {
            out.push_str(&format!("input: '{}' ({} bytes)\n", payload, payload.len()));
        }
        if let Some(baseline) = &self.baseline_fingerprint {
            out.push_str(&format!("baseline: {}\n", baseline));
        }

        out.push_str("\nVariants:\n");
        for variant in &self.variants {
            out.push_str(&format!(
                "  {} (build {:.2}s, run {}ms, size {} bytes, fingerprint {})\n",
                variant.configuration,
                variant.build_duration_s,
                variant.run_time_ms,
                variant.code_size_bytes,
                variant.fingerprint
            ));
        }
        for failure in &self.failures {
            out.push_str(&format!(
                "  {} FAILED at {}: {}\n",
                failure.variant, failure.stage, failure.reason
            ));
        }

        out.push_str(&format!(
            "\nCorrectness: {}\n",
            match self.verdict.correctness {
                CorrectnessVerdict::Pass => "PASS",
                CorrectnessVerdict::Fail => "FAIL",
            }
        ));
        out.push_str(&format!(
            "Performance: {}\n",
            match self.verdict.performance {
                PerformanceVerdict::Pass => "PASS",
                PerformanceVerdict::Fail => "FAIL (poor optimization)",
                PerformanceVerdict::NotApplicable => "N/A",
            }
        ));
        for comparison in &self.verdict.comparisons {
            match comparison.ratio {
                Some(ratio) => out.push_str(&format!(
                    "  {} vs {}: {:.2}x\n",
                    comparison.candidate, comparison.reference, ratio
                )),
                None => out.push_str(&format!(
                    "  {} vs {}: N/A\n",
                    comparison.candidate, comparison.reference
                )),
            }
        }

        if !self.verdict.violations.is_empty() {
            out.push_str("\nViolations:\n");
            for violation in &self.verdict.violations {
                out.push_str(&format!("  - {}\n", violation));
            }
        }

        out.push_str(&format!(
            "\nOverall: {}\n",
            if self.success { "PASS" } else { "FAIL" }
        ));
        out
    }
}
