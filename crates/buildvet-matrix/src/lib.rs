//! Buildvet Matrix Engine
//!
//! Expands a configuration matrix into build variants, drives an external
//! build backend per variant inside an isolated workspace, executes the
//! built artifact, extracts metrics, and produces a regression verdict.

pub mod analyzer;
pub mod backend;
mod exec;
pub mod matrix;
pub mod metrics;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod size;
pub mod workspace;

pub use analyzer::{RegressionAnalyzer, RegressionConfig, DEFAULT_PERFORMANCE_THRESHOLD};
pub use backend::{BuildBackend, CmakeBackend};
pub use matrix::MatrixSpec;
pub use metrics::{extract, Metrics, CODE_SIZE_KEY, FINGERPRINT_KEYS, RUN_TIME_KEY};
pub use orchestrator::{BuildOrchestrator, BuildOutcome};
pub use pipeline::{FailurePolicy, MatrixPipeline, PipelineOptions, SessionOutcome};
pub use report::{ValidationReport, VariantReport, REPORT_FILE_NAME};
pub use runner::{ArtifactRunner, DEFAULT_ARTIFACT_NAME};
pub use size::inspect_code_size;
pub use workspace::{cleanup_all, cleanup_report, ScopedWorkspace};
