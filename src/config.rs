//! Index configuration.
//!
//! Tolerance is carried here rather than in a module-level constant so that
//! two indexes built under different tolerance regimes can coexist and be
//! tested side by side.

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Default envelope padding, in the geometry's distance units.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// What `bulk_load` does when handed an empty sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyIndexPolicy {
    /// Build an empty index that answers every query with no results.
    #[default]
    Allow,
    /// Fail with [`IndexError::EmptyInput`].
    Reject,
}

/// Index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Padding applied to every entity envelope on all four sides.
    #[serde(default = "IndexConfig::default_tolerance")]
    pub tolerance: f64,

    #[serde(default)]
    pub empty_policy: EmptyIndexPolicy,
}

impl IndexConfig {
    const fn default_tolerance() -> f64 {
        DEFAULT_TOLERANCE
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        if tolerance.is_finite() && tolerance > 1.0 {
            log::warn!(
                "Tolerance of {} is very large; envelope queries will return many false positives",
                tolerance
            );
        }

        self.tolerance = tolerance;
        self
    }

    pub fn with_empty_policy(mut self, policy: EmptyIndexPolicy) -> Self {
        self.empty_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(IndexError::InvalidTolerance(self.tolerance));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: IndexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: IndexConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            tolerance: Self::default_tolerance(),
            empty_policy: EmptyIndexPolicy::default(),
        }
    }
}
