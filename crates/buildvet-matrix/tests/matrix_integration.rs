//! Integration tests for the validation pipeline with a scripted backend.

use std::collections::{BTreeMap, HashMap};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use buildvet_core::{BuildStage, BuildVariant, Generator, MatrixError, Result};
use buildvet_matrix::{
    BuildBackend, FailurePolicy, MatrixPipeline, MatrixSpec, PipelineOptions, RegressionConfig,
    DEFAULT_ARTIFACT_NAME, REPORT_FILE_NAME,
};

/// Per-variant behavior of the scripted backend.
#[derive(Debug, Clone)]
struct ScriptedVariant {
    /// Lines the fake artifact prints to stdout.
    stdout_lines: Vec<String>,
    /// Fail the compile step instead of producing an artifact.
    fail_compile: bool,
}

impl ScriptedVariant {
    fn emitting(crc: &str, time_ms: u64) -> Self {
        Self {
            stdout_lines: vec![
                format!("RESULT_CRC={crc}"),
                format!("RESULT_TIME_MS={time_ms}"),
            ],
            fail_compile: false,
        }
    }

    fn broken_build() -> Self {
        Self {
            stdout_lines: vec![],
            fail_compile: true,
        }
    }
}

/// Backend whose "compiler" writes a shell script standing in for the
/// built artifact.
struct ScriptedBackend {
    by_opt_flag: HashMap<String, ScriptedVariant>,
}

impl ScriptedBackend {
    fn new(entries: &[(&str, ScriptedVariant)]) -> Self {
        Self {
            by_opt_flag: entries
                .iter()
                .map(|(flag, v)| (flag.to_string(), v.clone()))
                .collect(),
        }
    }

    fn variant_for(&self, variant: &BuildVariant) -> ScriptedVariant {
        self.by_opt_flag
            .get(&variant.opt_flag)
            .cloned()
            .unwrap_or_else(|| ScriptedVariant::emitting("c1d46223", 100))
    }
}

#[async_trait]
impl BuildBackend for ScriptedBackend {
    async fn configure(&self, _variant: &BuildVariant, workspace: &Path) -> Result<()> {
        std::fs::write(workspace.join("build.cfg"), b"configured")?;
        Ok(())
    }

    async fn compile(&self, variant: &BuildVariant, workspace: &Path) -> Result<Duration> {
        let scripted = self.variant_for(variant);
        if scripted.fail_compile {
            return Err(MatrixError::Build {
                stage: BuildStage::Compile,
                variant: variant.workspace_id.clone(),
                diagnostics: "internal compiler error".to_string(),
            });
        }

        let mut body = String::from("#!/bin/sh\n");
        for line in &scripted.stdout_lines {
            body.push_str(&format!("echo \"{line}\"\n"));
        }

        let artifact = workspace.join(DEFAULT_ARTIFACT_NAME);
        std::fs::write(&artifact, body)?;
        let mut perms = std::fs::metadata(&artifact)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&artifact, perms)?;

        Ok(Duration::from_millis(50))
    }
}

fn two_variant_matrix() -> Vec<BuildVariant> {
    MatrixSpec::new(
        Generator::Make,
        vec!["-O0".to_string(), "-O3".to_string()],
        BTreeMap::new(),
    )
    .expand()
    .expect("expand failed")
}

fn options_in(root: &Path) -> PipelineOptions {
    PipelineOptions {
        workspace_root: root.join("build-matrix"),
        ..PipelineOptions::default()
    }
}

/// Test: the "hello" scenario — identical fingerprints, 120/80ms, PASS.
#[tokio::test]
async fn test_successful_session() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::emitting("c1d46223", 120)),
        ("-O3", ScriptedVariant::emitting("c1d46223", 80)),
    ]);

    let options = PipelineOptions {
        input_payload: Some("hello".to_string()),
        baseline_fingerprint: Some("c1d46223".to_string()),
        ..options_in(dir.path())
    };

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options)
        .await
        .expect("pipeline failed");

    assert!(outcome.report.success, "overall verdict should be PASS");
    assert_eq!(outcome.session.results.len(), 2);
    assert_eq!(outcome.report.variants.len(), 2);

    let ratio = outcome.report.verdict.comparisons[0]
        .ratio
        .expect("ratio should be defined");
    assert!((ratio - 1.5).abs() < 1e-9, "120/80 should give 1.5");
}

/// Test: changing the optimized fingerprint fails correctness and the
/// report names both disagreeing variants with their values.
#[tokio::test]
async fn test_fingerprint_mismatch_reported() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::emitting("c1d46223", 120)),
        ("-O3", ScriptedVariant::emitting("deadbeef", 80)),
    ]);

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options_in(dir.path()))
        .await
        .expect("pipeline failed");

    assert!(!outcome.report.success);
    let violations = &outcome.report.verdict.violations;
    assert!(violations.iter().any(|v| v.contains("c1d46223")));
    assert!(violations.iter().any(|v| v.contains("deadbeef")));

    let text = outcome.report.render_text();
    assert!(text.contains("Correctness: FAIL"));
}

/// Test: case-insensitive fingerprint comparison across variants.
#[tokio::test]
async fn test_mixed_case_fingerprints_still_pass() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::emitting("C1D46223", 120)),
        ("-O3", ScriptedVariant::emitting("c1d46223", 80)),
    ]);

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options_in(dir.path()))
        .await
        .expect("pipeline failed");

    assert!(outcome.report.success);
}

/// Test: artifact output without a fingerprint aborts before analysis.
#[tokio::test]
async fn test_missing_fingerprint_aborts_fail_fast() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[(
        "-O0",
        ScriptedVariant {
            stdout_lines: vec!["RESULT_TIME_MS=120".to_string()],
            fail_compile: false,
        },
    )]);

    let err = MatrixPipeline::run(&backend, &two_variant_matrix(), &options_in(dir.path()))
        .await
        .unwrap_err();

    assert!(matches!(err, MatrixError::Parse { .. }));
}

/// Test: fail-fast aborts the session on the first build failure.
#[tokio::test]
async fn test_fail_fast_aborts_on_build_error() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::broken_build()),
        ("-O3", ScriptedVariant::emitting("c1d46223", 80)),
    ]);

    let err = MatrixPipeline::run(&backend, &two_variant_matrix(), &options_in(dir.path()))
        .await
        .unwrap_err();

    match err {
        MatrixError::Build { stage, .. } => assert_eq!(stage, BuildStage::Compile),
        other => panic!("expected Build error, got {other:?}"),
    }
}

/// Test: collect-all records the failure and completes the session.
#[tokio::test]
async fn test_collect_all_records_failure_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::broken_build()),
        ("-O3", ScriptedVariant::emitting("c1d46223", 80)),
    ]);

    let options = PipelineOptions {
        failure_policy: FailurePolicy::CollectAll,
        ..options_in(dir.path())
    };

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options)
        .await
        .expect("collect-all must complete");

    assert_eq!(outcome.session.results.len(), 1);
    assert_eq!(outcome.session.failures.len(), 1);
    assert_eq!(outcome.session.failures[0].stage, "compile");
    assert!(!outcome.report.success, "a failed variant blocks success");

    let text = outcome.report.render_text();
    assert!(text.contains("FAILED at compile"));
}

/// Test: the payload reaches the artifact as a single argument.
#[tokio::test]
async fn test_payload_forwarded_to_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        (
            "-O0",
            ScriptedVariant {
                stdout_lines: vec!["RESULT_CRC=$1".to_string()],
                fail_compile: false,
            },
        ),
        (
            "-O3",
            ScriptedVariant {
                stdout_lines: vec!["RESULT_CRC=$1".to_string()],
                fail_compile: false,
            },
        ),
    ]);

    let options = PipelineOptions {
        input_payload: Some("feedface".to_string()),
        ..options_in(dir.path())
    };

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options)
        .await
        .expect("pipeline failed");

    for result in &outcome.session.results {
        assert_eq!(result.fingerprint, "feedface");
    }
}

/// Test: report persists to the well-known path and parses back.
#[tokio::test]
async fn test_report_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::emitting("c1d46223", 120)),
        ("-O3", ScriptedVariant::emitting("c1d46223", 80)),
    ]);

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options_in(dir.path()))
        .await
        .expect("pipeline failed");

    let report_path = dir.path().join(REPORT_FILE_NAME);
    outcome.report.write_json(&report_path).expect("write failed");

    let content = std::fs::read_to_string(&report_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("invalid JSON");
    assert_eq!(parsed["success"], serde_json::json!(true));
    assert_eq!(parsed["variants"].as_array().unwrap().len(), 2);
}

/// Test: a stricter threshold flips the performance verdict.
#[tokio::test]
async fn test_custom_threshold_applied() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(&[
        ("-O0", ScriptedVariant::emitting("c1d46223", 120)),
        ("-O3", ScriptedVariant::emitting("c1d46223", 100)),
    ]);

    let options = PipelineOptions {
        regression: RegressionConfig {
            performance_threshold: 1.5,
        },
        ..options_in(dir.path())
    };

    let outcome = MatrixPipeline::run(&backend, &two_variant_matrix(), &options)
        .await
        .expect("pipeline failed");

    // 120/100 = 1.2 < 1.5: poor optimization under the stricter gate.
    assert!(!outcome.report.success);
    assert!(outcome
        .report
        .verdict
        .violations
        .iter()
        .any(|v| v.contains("poor optimization")));
}
