//! Per-variant build results and the variant state machine.

use serde::{Deserialize, Serialize};

use crate::domain::variant::BuildVariant;

/// Outcome of executing the built artifact.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

/// Lifecycle state of a variant as it moves through the pipeline.
///
/// `Pending → Configured → Built → Executed → Parsed → Done`, with any
/// state able to transition to `Failed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VariantState {
    Pending,
    Configured,
    Built,
    Executed,
    Parsed,
    Done,
    Failed { reason: String },
}

impl VariantState {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(&self, next: &VariantState) -> bool {
        if matches!(next, VariantState::Failed { .. }) {
            // Any non-terminal state may fail.
            return !matches!(self, VariantState::Done | VariantState::Failed { .. });
        }
        matches!(
            (self, next),
            (VariantState::Pending, VariantState::Configured)
                | (VariantState::Configured, VariantState::Built)
                | (VariantState::Built, VariantState::Executed)
                | (VariantState::Executed, VariantState::Parsed)
                | (VariantState::Parsed, VariantState::Done)
        )
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VariantState::Done | VariantState::Failed { .. })
    }
}

/// Metrics collected for one build variant.
///
/// Created once per variant per invocation and never mutated; a rebuild
/// produces a new `BuildResult`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildResult {
    /// The variant this result belongs to.
    pub variant: BuildVariant,

    /// Wall-clock duration of the build step in seconds.
    pub build_duration_s: f64,

    /// Code size in bytes; 0 means unavailable.
    pub code_size_bytes: u64,

    /// Correctness fingerprint emitted by the artifact (opaque hex string).
    pub fingerprint: String,

    /// Artifact run duration in milliseconds; 0 means unavailable.
    pub run_time_ms: u64,

    /// Whether the artifact executed successfully.
    pub status: ExecutionStatus,
}

impl BuildResult {
    /// Whether this result can participate in a performance comparison.
    pub fn has_run_time(&self) -> bool {
        self.run_time_ms > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::variant::Generator;
    use std::collections::BTreeMap;

    fn result_with_time(run_time_ms: u64) -> BuildResult {
        BuildResult {
            variant: BuildVariant::new(Generator::Make, "-O0", BTreeMap::new()),
            build_duration_s: 1.5,
            code_size_bytes: 4096,
            fingerprint: "c1d46223".to_string(),
            run_time_ms,
            status: ExecutionStatus::Succeeded,
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let order = [
            VariantState::Pending,
            VariantState::Configured,
            VariantState::Built,
            VariantState::Executed,
            VariantState::Parsed,
            VariantState::Done,
        ];
        for pair in order.windows(2) {
            assert!(
                pair[0].can_transition_to(&pair[1]),
                "{:?} -> {:?} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!VariantState::Pending.can_transition_to(&VariantState::Built));
        assert!(!VariantState::Configured.can_transition_to(&VariantState::Executed));
        assert!(!VariantState::Built.can_transition_to(&VariantState::Done));
    }

    #[test]
    fn test_any_active_state_can_fail() {
        let failed = VariantState::Failed {
            reason: "compile error".to_string(),
        };
        assert!(VariantState::Pending.can_transition_to(&failed));
        assert!(VariantState::Executed.can_transition_to(&failed));
        assert!(!VariantState::Done.can_transition_to(&failed));
        assert!(!failed.clone().can_transition_to(&failed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(VariantState::Done.is_terminal());
        assert!(VariantState::Failed {
            reason: "x".to_string()
        }
        .is_terminal());
        assert!(!VariantState::Parsed.is_terminal());
    }

    #[test]
    fn test_has_run_time() {
        assert!(result_with_time(80).has_run_time());
        assert!(!result_with_time(0).has_run_time());
    }
}
