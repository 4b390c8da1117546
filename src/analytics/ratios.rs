//! Ratios derived from a volume summary.
//!
//! Division by zero yields 0. No ratio is ever NaN or infinite.

use crate::analytics::volume::VolumeSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `numerator / denominator`, or 0 when the quotient is not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let q = numerator / denominator;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}

/// Named exposure ratios.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratios {
    /// outbound / inbound
    pub outbound_to_inbound: f64,
    /// internal / total
    pub internal_to_total: f64,
    /// May be negative.
    pub net_to_total: f64,
    /// total / record count
    pub average_magnitude: f64,
}

impl Ratios {
    /// Metric name of [`Ratios::outbound_to_inbound`].
    pub const OUTBOUND_TO_INBOUND: &'static str = "outboundToInbound";
    /// Metric name of [`Ratios::internal_to_total`].
    pub const INTERNAL_TO_TOTAL: &'static str = "internalToTotal";
    /// Metric name of [`Ratios::net_to_total`].
    pub const NET_TO_TOTAL: &'static str = "netToTotal";
    /// Metric name of [`Ratios::average_magnitude`].
    pub const AVERAGE_MAGNITUDE: &'static str = "averageMagnitude";

    /// Ratios keyed by metric name, for weighted combination.
    pub fn as_metrics(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            (Self::OUTBOUND_TO_INBOUND.to_string(), self.outbound_to_inbound),
            (Self::INTERNAL_TO_TOTAL.to_string(), self.internal_to_total),
            (Self::NET_TO_TOTAL.to_string(), self.net_to_total),
            (Self::AVERAGE_MAGNITUDE.to_string(), self.average_magnitude),
        ])
    }
}

/// Derive ratios from volume sums.
pub fn ratios(volume: &VolumeSummary) -> Ratios {
    let total = volume.total as f64;
    Ratios {
        outbound_to_inbound: safe_div(volume.outbound as f64, volume.inbound as f64),
        internal_to_total: safe_div(volume.internal as f64, total),
        net_to_total: safe_div(volume.net as f64, total),
        average_magnitude: safe_div(total, volume.record_count as f64),
    }
}
