//! Ledger configuration.
//!
//! Serde-driven, with defaults for every field.

use crate::analytics::default_weights;
use crate::compliance::{BoundaryGuard, DEFAULT_FORBIDDEN_KEYWORDS};
use crate::core::{LedgerError, Result};
use crate::telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One hour.
pub const DEFAULT_WINDOW_WIDTH_MS: i64 = 3_600_000;

/// Ledger configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerConfig {
    /// Width of time-series windows
    pub window_width_ms: i64,
    /// Weights for the weighted metric combination
    pub metric_weights: BTreeMap<String, f64>,
    /// Page size applied by views when a filter sets no limit
    pub default_page_size: Option<usize>,
    /// Keywords for the boundary guard
    pub forbidden_keywords: Vec<String>,
    /// Logging setup
    pub logging: LoggingConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            window_width_ms: DEFAULT_WINDOW_WIDTH_MS,
            metric_weights: default_weights(),
            default_page_size: None,
            forbidden_keywords: DEFAULT_FORBIDDEN_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges. Fails with `CONFIG_ERROR`.
    pub fn validate(&self) -> Result<()> {
        if self.window_width_ms <= 0 {
            return Err(LedgerError::Config(
                "windowWidthMs must be positive".to_string(),
            ));
        }
        for (name, weight) in &self.metric_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(LedgerError::Config(format!(
                    "weight for {name} must be finite and non-negative"
                )));
            }
        }
        if self.default_page_size == Some(0) {
            return Err(LedgerError::Config(
                "defaultPageSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Boundary guard over the configured keywords.
    pub fn boundary_guard(&self) -> BoundaryGuard {
        BoundaryGuard::new(self.forbidden_keywords.as_slice())
    }
}
