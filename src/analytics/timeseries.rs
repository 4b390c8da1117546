//! Fixed-width time series.

use crate::analytics::volume::{volume, Measurable, VolumeSummary};
use crate::chain::Record;
use crate::core::{LedgerError, Result, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One populated window: `[start, end)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive window start
    pub start: Timestamp,
    /// Exclusive window end
    pub end: Timestamp,
    /// Volume of the records inside the window
    pub volume: VolumeSummary,
}

/// Per-window volumes plus the overall aggregation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    /// Window width in milliseconds
    pub width_ms: i64,
    /// Populated windows, ascending by start
    pub windows: Vec<TimeWindow>,
    /// Volume over every input record
    pub overall: VolumeSummary,
}

/// Start of the window containing `at`. Windows are aligned to the epoch.
pub fn window_start(at: Timestamp, width_ms: i64) -> Timestamp {
    let millis = at.as_millis();
    Timestamp::from_millis(millis - millis.rem_euclid(width_ms))
}

/// Partition records into epoch-aligned windows of `width_ms`.
///
/// Only windows holding at least one record are returned, in ascending order.
pub fn time_series<'a, P, I>(records: I, width_ms: i64) -> Result<TimeSeries>
where
    P: Measurable + 'a,
    I: IntoIterator<Item = &'a Record<P>>,
{
    if width_ms <= 0 {
        return Err(LedgerError::invalid("width_ms", "window width must be positive"));
    }

    let all: Vec<&Record<P>> = records.into_iter().collect();
    let mut buckets: BTreeMap<Timestamp, Vec<&Record<P>>> = BTreeMap::new();
    for record in all.iter().copied() {
        buckets
            .entry(window_start(record.created_at(), width_ms))
            .or_default()
            .push(record);
    }

    let windows = buckets
        .into_iter()
        .map(|(start, members)| TimeWindow {
            start,
            end: Timestamp::from_millis(start.as_millis().saturating_add(width_ms)),
            volume: volume(members),
        })
        .collect();

    Ok(TimeSeries {
        width_ms,
        windows,
        overall: volume(all),
    })
}
