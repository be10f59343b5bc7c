//! Buildvet Core Library
//!
//! Domain model for the build-matrix validation engine: variants, results,
//! sessions, verdicts, and the shared error taxonomy.

pub mod domain;
pub mod telemetry;

pub use domain::{
    BuildResult, BuildStage, BuildVariant, CorrectnessVerdict, ExecutionStatus, Generator,
    MatrixError, PerfComparison, PerformanceVerdict, RegressionVerdict, Result,
    ValidationSession, VariantFailure, VariantState,
};

pub use telemetry::init_tracing;

/// Buildvet version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
