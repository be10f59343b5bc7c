//! Binary code-size inspection via the external `size` utility.

use std::path::Path;

use tracing::debug;

use crate::exec::{run_command, ExecOutcome};

/// Inspect the built artifact's code size in bytes.
///
/// Runs `size <artifact>` in the workspace and interprets the first
/// whitespace-separated field of the first data line (the `text` section)
/// as the size. The utility's output varies across platforms, so any
/// failure — missing utility, non-zero exit, unparsable report — yields 0
/// ("unavailable"), never an error.
pub async fn inspect_code_size(workspace: &Path, artifact_name: &str) -> u64 {
    let args = vec![artifact_name.to_string()];
    let outcome = match run_command("size", &args, Some(workspace), 30).await {
        Ok(outcome) => outcome,
        Err(e) => {
            debug!(error = %e, "size utility unavailable");
            return 0;
        }
    };

    match outcome {
        ExecOutcome::Completed(output) if output.success() => parse_size_report(&output.stdout),
        _ => 0,
    }
}

/// Parse a `size` report; see [`inspect_code_size`]. Returns 0 when the
/// report has no parsable data line.
pub fn parse_size_report(report: &str) -> u64 {
    report
        .lines()
        .nth(1)
        .and_then(|line| line.split_whitespace().next())
        .and_then(|field| field.parse::<u64>().ok())
        .unwrap_or(0)
}
