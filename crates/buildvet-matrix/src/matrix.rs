//! Configuration-matrix expansion.

use std::collections::BTreeMap;

use buildvet_core::{BuildVariant, Generator, MatrixError, Result};

/// Requested configuration matrix for one invocation.
///
/// Expansion order is significant: variants follow the requested
/// optimization-flag order, and the first flag is the designated reference
/// (least optimized) for performance comparison.
#[derive(Debug, Clone)]
pub struct MatrixSpec {
    /// Build-system generator for every variant.
    pub generator: Generator,

    /// Optimization flags to compare, least optimized first.
    pub opt_flags: Vec<String>,

    /// Feature-flag assignments applied to every variant.
    pub features: BTreeMap<String, String>,
}

impl MatrixSpec {
    /// Create a matrix spec.
    pub fn new(
        generator: Generator,
        opt_flags: Vec<String>,
        features: BTreeMap<String, String>,
    ) -> Self {
        Self {
            generator,
            opt_flags,
            features,
        }
    }

    /// Expand into concrete build variants with distinct workspace ids.
    pub fn expand(&self) -> Result<Vec<BuildVariant>> {
        if self.opt_flags.is_empty() {
            return Err(MatrixError::Configuration(
                "optimization flag list is empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for flag in &self.opt_flags {
            if !seen.insert(flag.as_str()) {
                return Err(MatrixError::Configuration(format!(
                    "duplicate optimization flag: {flag}"
                )));
            }
        }

        Ok(self
            .opt_flags
            .iter()
            .map(|flag| BuildVariant::new(self.generator, flag, self.features.clone()))
            .collect())
    }
}
