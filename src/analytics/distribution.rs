//! Magnitude distribution and concentration.

use crate::analytics::ratios::safe_div;
use crate::analytics::volume::Measurable;
use crate::chain::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of one grouping key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Share {
    /// Summed magnitude for this key
    pub magnitude: u64,
    /// magnitude / total, in [0, 1]
    pub share: f64,
}

/// Per-key share of total magnitude.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    /// Summed magnitude over every key
    pub total: u64,
    /// Shares by key, in key order
    pub shares: BTreeMap<String, Share>,
    /// Herfindahl-style index: sum of squared shares, in [1/n, 1]; 0 when total is 0.
    pub concentration: f64,
}

impl Distribution {
    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.shares.len()
    }
}

/// Distribute magnitude over the keys produced by `key`.
pub fn distribution<'a, P, I, F>(records: I, key: F) -> Distribution
where
    P: Measurable + 'a,
    I: IntoIterator<Item = &'a Record<P>>,
    F: Fn(&Record<P>) -> String,
{
    let mut magnitudes: BTreeMap<String, u64> = BTreeMap::new();
    let mut total: u64 = 0;
    for record in records {
        let magnitude = record.payload().magnitude();
        let slot = magnitudes.entry(key(record)).or_insert(0);
        *slot = slot.saturating_add(magnitude);
        total = total.saturating_add(magnitude);
    }

    let shares: BTreeMap<String, Share> = magnitudes
        .into_iter()
        .map(|(k, magnitude)| {
            let share = safe_div(magnitude as f64, total as f64);
            (k, Share { magnitude, share })
        })
        .collect();
    let concentration = shares.values().map(|s| s.share * s.share).sum();

    Distribution {
        total,
        shares,
        concentration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::records;
    use crate::analytics::Direction;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_distribution_by_direction() {
        let recs = records(&[
            (Direction::Inbound, 100, 1_000),
            (Direction::Outbound, 50, 2_000),
            (Direction::Internal, 50, 3_000),
        ]);
        let dist = distribution(&recs, |r| r.payload().direction.to_string());
        assert_eq!(dist.total, 200);
        assert_eq!(dist.key_count(), 3);
        assert!(approx(dist.shares["INBOUND"].share, 0.5));
        assert!(approx(dist.shares["OUTBOUND"].share, 0.25));
        assert!(approx(dist.concentration, 0.25 + 0.0625 + 0.0625));
    }

    #[test]
    fn test_concentration_bounds() {
        let single = records(&[(Direction::Inbound, 7, 1_000), (Direction::Inbound, 3, 2_000)]);
        let dist = distribution(&single, |r| r.payload().subject_id.clone());
        assert!(approx(dist.concentration, 1.0));

        let even = records(&[
            (Direction::Inbound, 5, 1_000),
            (Direction::Outbound, 5, 2_000),
            (Direction::Internal, 5, 3_000),
            (Direction::Internal, 0, 4_000),
        ]);
        let dist = distribution(&even, |r| r.payload().external_ref_id.clone());
        assert_eq!(dist.key_count(), 4);
        assert!(dist.concentration >= 1.0 / 4.0 - 1e-9);
        assert!(dist.concentration <= 1.0 + 1e-9);
    }

    #[test]
    fn test_distribution_zero_total() {
        let recs = records(&[(Direction::Inbound, 0, 1_000)]);
        let dist = distribution(&recs, |r| r.payload().subject_id.clone());
        assert_eq!(dist.total, 0);
        assert_eq!(dist.shares.values().next().unwrap().share, 0.0);
        assert_eq!(dist.concentration, 0.0);
    }
}
