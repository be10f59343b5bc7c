//! Metric extraction from artifact output.
//!
//! The artifact emits `KEY=VALUE` result lines among arbitrary diagnostic
//! output. Recognition is a fixed table of key spellings mapped to typed
//! fields; unknown lines are ignored, never errors.

use buildvet_core::{MatrixError, Result};
use tracing::warn;

/// Accepted spellings for the correctness fingerprint key.
///
/// `RESULT_CRC` is current; `CRC_RESULT` is the legacy artifact's spelling.
pub const FINGERPRINT_KEYS: &[&str] = &["RESULT_CRC", "CRC_RESULT"];

/// Run time in milliseconds.
pub const RUN_TIME_KEY: &str = "RESULT_TIME_MS";

/// Code size in bytes.
pub const CODE_SIZE_KEY: &str = "RESULT_SIZE_B";

/// Typed metrics parsed from one artifact run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    /// Correctness fingerprint — opaque string, never decoded as an
    /// integer. Compared case-insensitively downstream.
    pub fingerprint: String,

    /// Run time in milliseconds; `None` degrades performance comparison
    /// to not-applicable.
    pub run_time_ms: Option<u64>,

    /// Code size in bytes, when the artifact self-reports it.
    pub code_size_bytes: Option<u64>,
}

/// Extract metrics from raw artifact stdout.
///
/// The fingerprint is mandatory: its absence is a hard parse failure for
/// the variant. Run time and code size are optional; a missing or
/// malformed value degrades the corresponding comparison instead of
/// failing the run.
pub fn extract(raw_stdout: &str) -> Result<Metrics> {
    let mut fingerprint: Option<String> = None;
    let mut run_time_ms: Option<u64> = None;
    let mut code_size_bytes: Option<u64> = None;

    for line in raw_stdout.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if FINGERPRINT_KEYS.contains(&key) {
            fingerprint = Some(value.to_string());
        } else if key == RUN_TIME_KEY {
            run_time_ms = parse_numeric(key, value);
        } else if key == CODE_SIZE_KEY {
            code_size_bytes = parse_numeric(key, value);
        }
        // Unknown keys (e.g. INPUT_SIZE from the legacy artifact) fall
        // through.
    }

    let fingerprint = fingerprint.ok_or_else(|| MatrixError::Parse {
        missing_key: FINGERPRINT_KEYS[0].to_string(),
    })?;

    Ok(Metrics {
        fingerprint,
        run_time_ms,
        code_size_bytes,
    })
}

fn parse_numeric(key: &str, value: &str) -> Option<u64> {
    match value.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(key, value, "ignoring malformed numeric metric");
            None
        }
    }
}
