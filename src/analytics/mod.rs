//! Aggregation engine.
//!
//! Pure functions over any slice of records. The same input always yields
//! the same output, and nothing here writes back to a registry.

pub mod distribution;
pub mod frequency;
pub mod ratios;
pub mod timeseries;
pub mod volume;
pub mod weighted;

pub use distribution::{distribution, Distribution, Share};
pub use frequency::{by_direction, frequency, Dimension, FrequencyNode};
pub use ratios::{ratios, safe_div, Ratios};
pub use timeseries::{time_series, window_start, TimeSeries, TimeWindow};
pub use volume::{volume, Direction, Measurable, VolumeSummary};
pub use weighted::{default_weights, weighted_combination, weighted_default, CONCENTRATION};
