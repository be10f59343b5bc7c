//! Buildvet - Build-Matrix Validation CLI
//!
//! The `buildvet` command validates a compiled artifact across a matrix of
//! build configurations.
//!
//! ## Commands
//!
//! - `run`: Build, execute, and cross-check every variant in the matrix
//! - `clean`: Remove all workspace directories and the report file

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use buildvet_core::Generator;
use buildvet_matrix::{
    cleanup_all, cleanup_report, CmakeBackend, FailurePolicy, MatrixPipeline, MatrixSpec,
    PipelineOptions, RegressionConfig, DEFAULT_ARTIFACT_NAME, DEFAULT_PERFORMANCE_THRESHOLD,
    REPORT_FILE_NAME,
};

#[derive(Parser)]
#[command(name = "buildvet")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build-matrix validation for compiled artifacts", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and validate every variant in the configuration matrix
    Run {
        /// Path to the project source directory (contains CMakeLists.txt)
        #[arg(short, long, default_value = ".")]
        source: PathBuf,

        /// Build-system generator (make or ninja)
        #[arg(short, long, default_value = "make")]
        generator: String,

        /// Optimization flags to compare, least optimized first
        /// (comma-separated)
        #[arg(long, default_value = "-O0,-O3")]
        opt_levels: String,

        /// Feature-flag cache entry, KEY=VALUE (repeatable)
        #[arg(long = "feature")]
        features: Vec<String>,

        /// Input payload passed to the artifact as its single argument
        #[arg(short, long)]
        input: Option<String>,

        /// Expected correctness fingerprint (case-insensitive)
        #[arg(short, long)]
        baseline: Option<String>,

        /// Minimum speedup the optimized variant must achieve
        #[arg(long, default_value_t = DEFAULT_PERFORMANCE_THRESHOLD)]
        threshold: f64,

        /// Artifact filename expected at the workspace root
        #[arg(long, default_value = DEFAULT_ARTIFACT_NAME)]
        artifact: String,

        /// Root directory for per-variant workspaces
        #[arg(long, default_value = "build-matrix")]
        workspace_root: PathBuf,

        /// Report output path
        #[arg(long, default_value = REPORT_FILE_NAME)]
        report: PathBuf,

        /// Bound on each build step and artifact run, in seconds
        #[arg(long, default_value = "600")]
        timeout_secs: u64,

        /// Run all variants to completion instead of stopping at the
        /// first failure
        #[arg(long)]
        keep_going: bool,
    },

    /// Remove all workspace directories and the report file
    Clean {
        /// Root directory for per-variant workspaces
        #[arg(long, default_value = "build-matrix")]
        workspace_root: PathBuf,

        /// Report output path
        #[arg(long, default_value = REPORT_FILE_NAME)]
        report: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    buildvet_core::init_tracing(cli.json, cli.verbose);

    match cli.command {
        Commands::Run {
            source,
            generator,
            opt_levels,
            features,
            input,
            baseline,
            threshold,
            artifact,
            workspace_root,
            report,
            timeout_secs,
            keep_going,
        } => {
            cmd_run(RunArgs {
                source,
                generator,
                opt_levels,
                features,
                input,
                baseline,
                threshold,
                artifact,
                workspace_root,
                report,
                timeout_secs,
                keep_going,
            })
            .await
        }
        Commands::Clean {
            workspace_root,
            report,
        } => cmd_clean(&workspace_root, &report),
    }
}

struct RunArgs {
    source: PathBuf,
    generator: String,
    opt_levels: String,
    features: Vec<String>,
    input: Option<String>,
    baseline: Option<String>,
    threshold: f64,
    artifact: String,
    workspace_root: PathBuf,
    report: PathBuf,
    timeout_secs: u64,
    keep_going: bool,
}

/// Build and validate the full matrix, then report and gate.
async fn cmd_run(args: RunArgs) -> Result<()> {
    let generator: Generator = args
        .generator
        .parse()
        .context("unsupported --generator value")?;
    let opt_flags = parse_opt_levels(&args.opt_levels);
    let features = parse_features(&args.features)?;

    let spec = MatrixSpec::new(generator, opt_flags, features);
    let variants = spec.expand().context("invalid configuration matrix")?;

    println!("Validating {} variants from {:?}", variants.len(), args.source);
    for variant in &variants {
        println!("  {} -> {}", variant.label(), variant.workspace_id);
    }
    println!();

    let backend = CmakeBackend::new(args.source, args.timeout_secs);
    let options = PipelineOptions {
        workspace_root: args.workspace_root,
        artifact_name: args.artifact,
        input_payload: args.input,
        baseline_fingerprint: args.baseline,
        regression: RegressionConfig {
            performance_threshold: args.threshold,
        },
        failure_policy: if args.keep_going {
            FailurePolicy::CollectAll
        } else {
            FailurePolicy::FailFast
        },
        run_timeout_secs: args.timeout_secs,
    };

    let outcome = MatrixPipeline::run(&backend, &variants, &options)
        .await
        .context("validation session aborted")?;

    outcome
        .report
        .write_json(&args.report)
        .with_context(|| format!("failed to persist report to {:?}", args.report))?;
    info!(report = %args.report.display(), "report persisted");

    println!("{}", outcome.report.render_text());

    if outcome.report.success {
        println!("✓ All validation gates passed");
        Ok(())
    } else {
        println!("✗ Validation failed");
        anyhow::bail!("validation gates failed")
    }
}

/// Remove workspaces and the report. Idempotent.
fn cmd_clean(workspace_root: &PathBuf, report: &PathBuf) -> Result<()> {
    cleanup_all(workspace_root)
        .with_context(|| format!("failed to remove workspaces under {workspace_root:?}"))?;
    cleanup_report(report).with_context(|| format!("failed to remove report {report:?}"))?;

    println!("Cleaned {:?} and {:?}", workspace_root, report);
    Ok(())
}

/// Split the comma-separated optimization flag list.
fn parse_opt_levels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse repeated KEY=VALUE feature assignments.
fn parse_features(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut features = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("invalid --feature '{entry}', expected KEY=VALUE"))?;
        features.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(features)
}
