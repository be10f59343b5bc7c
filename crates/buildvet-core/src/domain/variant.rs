//! Build variant identity and workspace naming.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::error::MatrixError;

/// Supported build-system generators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    /// Unix Makefiles (`make`).
    Make,
    /// Ninja (`ninja`).
    Ninja,
}

impl Generator {
    /// Short name used in workspace identifiers and CLI input.
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Make => "make",
            Generator::Ninja => "ninja",
        }
    }

    /// CMake generator name (`cmake -G <...>`).
    pub fn cmake_name(&self) -> &'static str {
        match self {
            Generator::Make => "Unix Makefiles",
            Generator::Ninja => "Ninja",
        }
    }

    /// Program that drives the build step.
    pub fn build_program(&self) -> &'static str {
        match self {
            Generator::Make => "make",
            Generator::Ninja => "ninja",
        }
    }
}

impl FromStr for Generator {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "make" => Ok(Generator::Make),
            "ninja" => Ok(Generator::Ninja),
            other => Err(MatrixError::Configuration(format!(
                "unsupported generator: {other} (expected make or ninja)"
            ))),
        }
    }
}

/// One point in the configuration matrix.
///
/// Identity is the `(generator, optimization flag, ordered feature map)`
/// tuple. The derived `workspace_id` is deterministic and collision-free:
/// a readable slug plus a truncated SHA-256 digest over the full tuple, so
/// two variants that differ only in feature flags still get distinct
/// workspaces. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildVariant {
    /// Build-system generator.
    pub generator: Generator,

    /// Compiler optimization flag (e.g. `-O0`, `-O3`).
    pub opt_flag: String,

    /// Feature-flag assignments passed to the backend as cache entries.
    /// BTreeMap keeps iteration order deterministic.
    pub features: BTreeMap<String, String>,

    /// Derived workspace directory name, unique per variant.
    pub workspace_id: String,
}

impl BuildVariant {
    /// Create a variant and derive its workspace identifier.
    pub fn new(generator: Generator, opt_flag: &str, features: BTreeMap<String, String>) -> Self {
        let workspace_id = derive_workspace_id(generator, opt_flag, &features);
        Self {
            generator,
            opt_flag: opt_flag.to_string(),
            features,
            workspace_id,
        }
    }

    /// Human-readable label for diagnostics and logs.
    pub fn label(&self) -> String {
        format!("{}_{}", self.generator.name(), self.opt_flag)
    }
}

/// Derive the workspace directory name for a configuration tuple.
///
/// Format: `build_<generator>_<opt-slug>_<digest12>`. The slug keeps the
/// directory recognizable; the digest guarantees distinctness.
fn derive_workspace_id(
    generator: Generator,
    opt_flag: &str,
    features: &BTreeMap<String, String>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(generator.name().as_bytes());
    hasher.update(b"\0");
    hasher.update(opt_flag.as_bytes());
    hasher.update(b"\0");
    for (key, value) in features {
        hasher.update(key.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"\0");
    }
    let digest = hex::encode(hasher.finalize());

    let opt_slug: String = opt_flag
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    format!("build_{}_{}_{}", generator.name(), opt_slug, &digest[..12])
}
