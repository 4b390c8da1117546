//! Weighted combination of named metrics.

use crate::analytics::ratios::{safe_div, Ratios};
use crate::core::{LedgerError, Result};
use std::collections::BTreeMap;

/// Default weights, applied when the caller supplies none.
///
/// | metric              | weight |
/// |---------------------|--------|
/// | `outboundToInbound` | 0.5    |
/// | `internalToTotal`   | 0.3    |
/// | `concentration`     | 0.2    |
pub fn default_weights() -> BTreeMap<String, f64> {
    BTreeMap::from([
        (Ratios::OUTBOUND_TO_INBOUND.to_string(), 0.5),
        (Ratios::INTERNAL_TO_TOTAL.to_string(), 0.3),
        (CONCENTRATION.to_string(), 0.2),
    ])
}

/// Metric name of the distribution concentration index.
pub const CONCENTRATION: &str = "concentration";

/// `Σ(value_i × weight_i) / Σ(weight_i)` over the weighted metrics.
///
/// A weighted metric missing from `values` counts as 0; values without a
/// weight are ignored. The result is 0 when the total weight is 0.
pub fn weighted_combination(
    values: &BTreeMap<String, f64>,
    weights: &BTreeMap<String, f64>,
) -> Result<f64> {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (name, weight) in weights {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(LedgerError::invalid(
                "weights",
                format!("weight for {name} must be finite and non-negative"),
            ));
        }
        let value = values.get(name).copied().unwrap_or(0.0);
        if !value.is_finite() {
            return Err(LedgerError::invalid(
                "values",
                format!("value for {name} must be finite"),
            ));
        }
        weighted_sum += value * weight;
        total_weight += weight;
    }
    Ok(safe_div(weighted_sum, total_weight))
}

/// Combination using [`default_weights`].
pub fn weighted_default(values: &BTreeMap<String, f64>) -> Result<f64> {
    weighted_combination(values, &default_weights())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_weighted_average() {
        let values = metrics(&[("a", 1.0), ("b", 0.0)]);
        let weights = metrics(&[("a", 3.0), ("b", 1.0)]);
        assert_eq!(weighted_combination(&values, &weights).unwrap(), 0.75);
    }

    #[test]
    fn test_zero_total_weight() {
        let values = metrics(&[("a", 5.0)]);
        assert_eq!(weighted_combination(&values, &metrics(&[("a", 0.0)])).unwrap(), 0.0);
        assert_eq!(weighted_combination(&values, &BTreeMap::new()).unwrap(), 0.0);
    }

    #[test]
    fn test_missing_value_counts_as_zero() {
        let values = metrics(&[("a", 1.0)]);
        let weights = metrics(&[("a", 1.0), ("missing", 1.0)]);
        assert_eq!(weighted_combination(&values, &weights).unwrap(), 0.5);
    }

    #[test]
    fn test_negative_weight_rejected() {
        let values = metrics(&[("a", 1.0)]);
        assert!(weighted_combination(&values, &metrics(&[("a", -1.0)])).is_err());
        assert!(weighted_combination(&values, &metrics(&[("a", f64::NAN)])).is_err());
    }

    #[test]
    fn test_default_weights() {
        let values = metrics(&[
            (Ratios::OUTBOUND_TO_INBOUND, 1.0),
            (Ratios::INTERNAL_TO_TOTAL, 1.0),
            (CONCENTRATION, 1.0),
        ]);
        assert!((weighted_default(&values).unwrap() - 1.0).abs() < 1e-12);
        let total: f64 = default_weights().values().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
