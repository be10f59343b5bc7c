//! Domain models for buildvet.
//!
//! Canonical definitions for the core entities:
//! - `BuildVariant`: one point in the configuration matrix
//! - `BuildResult`: metrics collected for one variant
//! - `ValidationSession`: all results from one invocation
//! - `RegressionVerdict`: derived pass/fail decision

pub mod error;
pub mod result;
pub mod session;
pub mod variant;
pub mod verdict;

// Re-export main types and errors
pub use error::{BuildStage, MatrixError, Result};
pub use result::{BuildResult, ExecutionStatus, VariantState};
pub use session::{ValidationSession, VariantFailure};
pub use variant::{BuildVariant, Generator};
pub use verdict::{
    CorrectnessVerdict, PerfComparison, PerformanceVerdict, RegressionVerdict,
};
