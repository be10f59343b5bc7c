//! Regression analysis across build variants.
//!
//! Correctness: every fingerprint must equal every other (and the baseline
//! when supplied), case-insensitively. Performance: each variant is
//! compared against the reference variant — the first result in matrix
//! order, by convention the least optimized — and the ratio
//! `reference_ms / variant_ms` must reach the configured threshold.

use buildvet_core::{
    BuildResult, CorrectnessVerdict, MatrixError, PerfComparison, PerformanceVerdict,
    RegressionVerdict, Result,
};
use tracing::info;

/// Minimum speedup the optimized variant must show over the reference.
pub const DEFAULT_PERFORMANCE_THRESHOLD: f64 = 1.05;

/// Tunable thresholds for regression analysis.
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    /// Minimum acceptable `reference_ms / variant_ms` ratio. A ratio below
    /// this means the expected-faster variant failed to outpace the
    /// reference ("poor optimization").
    pub performance_threshold: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            performance_threshold: DEFAULT_PERFORMANCE_THRESHOLD,
        }
    }
}

impl RegressionConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.performance_threshold.is_finite() || self.performance_threshold < 1.0 {
            return Err(MatrixError::Configuration(format!(
                "performance threshold must be a finite value >= 1.0, got {}",
                self.performance_threshold
            )));
        }
        Ok(())
    }
}

/// Compares metrics across variants and against a baseline fingerprint.
pub struct RegressionAnalyzer;

impl RegressionAnalyzer {
    /// Analyze a session's results.
    ///
    /// `results[0]` is the reference variant for performance ratios. Code
    /// size is carried in the results but is advisory and never gates.
    pub fn analyze(
        results: &[BuildResult],
        baseline: Option<&str>,
        config: &RegressionConfig,
    ) -> Result<RegressionVerdict> {
        config.validate()?;

        let mut violations = Vec::new();

        let correctness = Self::check_correctness(results, baseline, &mut violations);
        let (performance, comparisons) =
            Self::check_performance(results, config, &mut violations);

        info!(
            correctness = ?correctness,
            performance = ?performance,
            violations = violations.len(),
            "regression analysis complete"
        );

        Ok(RegressionVerdict {
            correctness,
            performance,
            comparisons,
            violations,
        })
    }

    fn check_correctness(
        results: &[BuildResult],
        baseline: Option<&str>,
        violations: &mut Vec<String>,
    ) -> CorrectnessVerdict {
        let mut pass = true;

        if let Some((first, rest)) = results.split_first() {
            for other in rest {
                if !first.fingerprint.eq_ignore_ascii_case(&other.fingerprint) {
                    pass = false;
                    violations.push(format!(
                        "fingerprint mismatch: {} produced {} but {} produced {}",
                        first.variant.workspace_id,
                        first.fingerprint,
                        other.variant.workspace_id,
                        other.fingerprint
                    ));
                }
            }
        }

        if let Some(expected) = baseline {
            for result in results {
                if !result.fingerprint.eq_ignore_ascii_case(expected) {
                    pass = false;
                    violations.push(format!(
                        "baseline mismatch: {} produced {} but baseline is {}",
                        result.variant.workspace_id, result.fingerprint, expected
                    ));
                }
            }
        }

        if pass {
            CorrectnessVerdict::Pass
        } else {
            CorrectnessVerdict::Fail
        }
    }

    fn check_performance(
        results: &[BuildResult],
        config: &RegressionConfig,
        violations: &mut Vec<String>,
    ) -> (PerformanceVerdict, Vec<PerfComparison>) {
        let Some((reference, candidates)) = results.split_first() else {
            return (PerformanceVerdict::NotApplicable, Vec::new());
        };
        if candidates.is_empty() {
            return (PerformanceVerdict::NotApplicable, Vec::new());
        }

        let mut comparisons = Vec::new();
        let mut any_applicable = false;
        let mut any_failed = false;

        for candidate in candidates {
            let ratio = if reference.has_run_time() && candidate.has_run_time() {
                Some(reference.run_time_ms as f64 / candidate.run_time_ms as f64)
            } else {
                None
            };

            if let Some(ratio) = ratio {
                any_applicable = true;
                if ratio < config.performance_threshold {
                    any_failed = true;
                    violations.push(format!(
                        "poor optimization: {} is only {:.2}x faster than {} (threshold {:.2})",
                        candidate.variant.workspace_id,
                        ratio,
                        reference.variant.workspace_id,
                        config.performance_threshold
                    ));
                }
            }

            comparisons.push(PerfComparison {
                reference: reference.variant.workspace_id.clone(),
                candidate: candidate.variant.workspace_id.clone(),
                ratio,
            });
        }

        let verdict = if !any_applicable {
            PerformanceVerdict::NotApplicable
        } else if any_failed {
            PerformanceVerdict::Fail
        } else {
            PerformanceVerdict::Pass
        };

        (verdict, comparisons)
    }
}
