//! Regression verdicts derived from a set of build results.

use serde::{Deserialize, Serialize};

/// Correctness gate outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CorrectnessVerdict {
    Pass,
    Fail,
}

/// Performance gate outcome.
///
/// `NotApplicable` covers sessions where no pair of results had strictly
/// positive run times, or fewer than two results were collected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerformanceVerdict {
    Pass,
    Fail,
    NotApplicable,
}

/// One pairwise run-time comparison against the reference variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerfComparison {
    /// Workspace id of the reference (least optimized) variant.
    pub reference: String,

    /// Workspace id of the compared (expected faster) variant.
    pub candidate: String,

    /// `reference_ms / candidate_ms`; `None` when either run time is zero.
    pub ratio: Option<f64>,
}

/// Derived, read-only verdict for one validation session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionVerdict {
    pub correctness: CorrectnessVerdict,
    pub performance: PerformanceVerdict,

    /// Pairwise comparisons against the reference variant, in matrix order.
    pub comparisons: Vec<PerfComparison>,

    /// Human-readable diagnostics for every gate violation (empty on pass).
    pub violations: Vec<String>,
}

impl RegressionVerdict {
    /// Overall success: correctness passed and performance did not fail.
    pub fn success(&self) -> bool {
        self.correctness == CorrectnessVerdict::Pass
            && self.performance != PerformanceVerdict::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(
        correctness: CorrectnessVerdict,
        performance: PerformanceVerdict,
    ) -> RegressionVerdict {
        RegressionVerdict {
            correctness,
            performance,
            comparisons: vec![],
            violations: vec![],
        }
    }

    #[test]
    fn test_success_requires_correctness_pass() {
        assert!(!verdict(CorrectnessVerdict::Fail, PerformanceVerdict::Pass).success());
    }

    #[test]
    fn test_success_tolerates_not_applicable_performance() {
        assert!(verdict(CorrectnessVerdict::Pass, PerformanceVerdict::NotApplicable).success());
    }

    #[test]
    fn test_performance_fail_blocks_success() {
        assert!(!verdict(CorrectnessVerdict::Pass, PerformanceVerdict::Fail).success());
    }

    #[test]
    fn test_full_pass() {
        assert!(verdict(CorrectnessVerdict::Pass, PerformanceVerdict::Pass).success());
    }

    #[test]
    fn test_verdict_serializes_with_screaming_case() {
        let v = verdict(CorrectnessVerdict::Pass, PerformanceVerdict::NotApplicable);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"PASS\""));
        assert!(json.contains("\"NOT_APPLICABLE\""));
    }
}
