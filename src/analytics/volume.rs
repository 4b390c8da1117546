//! Volume aggregation.

use crate::chain::Record;
use serde::{Deserialize, Serialize};

/// Fixed three-way classification of a magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Inbound,
    Outbound,
    Internal,
}

impl Direction {
    /// Wire label, e.g. `INBOUND`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "INBOUND",
            Direction::Outbound => "OUTBOUND",
            Direction::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payload carrying an abstract unit magnitude and its direction.
pub trait Measurable {
    /// Non-negative unit count.
    fn magnitude(&self) -> u64;
    fn direction(&self) -> Direction;
}

/// Sums per direction over a slice of records.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeSummary {
    /// Sum of inbound magnitudes
    pub inbound: u64,
    /// Sum of outbound magnitudes
    pub outbound: u64,
    /// Sum of internal magnitudes
    pub internal: u64,
    /// inbound + outbound + internal
    pub total: u64,
    /// inbound - outbound
    pub net: i128,
    /// Records aggregated
    pub record_count: u64,
}

impl VolumeSummary {
    fn add(&mut self, direction: Direction, magnitude: u64) {
        match direction {
            Direction::Inbound => self.inbound = self.inbound.saturating_add(magnitude),
            Direction::Outbound => self.outbound = self.outbound.saturating_add(magnitude),
            Direction::Internal => self.internal = self.internal.saturating_add(magnitude),
        }
        self.total = self.total.saturating_add(magnitude);
        self.record_count += 1;
    }
}

/// Aggregate volume over records.
pub fn volume<'a, P, I>(records: I) -> VolumeSummary
where
    P: Measurable + 'a,
    I: IntoIterator<Item = &'a Record<P>>,
{
    let mut summary = VolumeSummary::default();
    for record in records {
        let payload = record.payload();
        summary.add(payload.direction(), payload.magnitude());
    }
    summary.net = summary.inbound as i128 - summary.outbound as i128;
    summary
}
