//! Flow tracking domain.
//!
//! Unit movements keyed by an external reference id. Re-submitting the same
//! reference is rejected as a duplicate; flows have no terminal state.

use crate::analytics::{Direction, Measurable};
use crate::chain::Domain;
use crate::core::{Result, Timestamp};
use crate::domains::validate::{check_notes, non_negative, positive_timestamp, require};
use crate::registry::ChainedRegistry;
use serde::{Deserialize, Serialize};

/// Where a flow was reported from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowSource {
    /// Manual admin intake
    Manual,
    /// External adapter
    External,
    /// Generated by the platform itself
    System,
}

impl FlowSource {
    /// Wire label, e.g. `MANUAL`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowSource::Manual => "MANUAL",
            FlowSource::External => "EXTERNAL",
            FlowSource::System => "SYSTEM",
        }
    }
}

/// Caller-supplied flow.
#[derive(Clone, Debug)]
pub struct FlowInput {
    /// Reference id in the reporting system; the natural key
    pub external_ref_id: String,
    /// Subject the units moved for
    pub subject_id: String,
    /// Direction of the movement
    pub direction: Direction,
    /// Reporting source
    pub source: FlowSource,
    /// Unit count; must be non-negative
    pub units: i64,
    /// Event time in milliseconds since the epoch
    pub timestamp: i64,
    /// Actor reporting the flow
    pub operator: String,
    /// Optional free text
    pub notes: Option<String>,
}

impl FlowInput {
    /// Create a flow input. The operator must be set before appending.
    pub fn new(
        external_ref_id: &str,
        subject_id: &str,
        direction: Direction,
        units: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            external_ref_id: external_ref_id.to_string(),
            subject_id: subject_id.to_string(),
            direction,
            source: FlowSource::Manual,
            units,
            timestamp,
            operator: String::new(),
            notes: None,
        }
    }

    /// Set the reporting source.
    pub fn with_source(mut self, source: FlowSource) -> Self {
        self.source = source;
        self
    }

    /// Set the reporting actor.
    pub fn with_operator(mut self, operator: &str) -> Self {
        self.operator = operator.to_string();
        self
    }

    /// Attach free-text notes.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Validated flow stored in a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPayload {
    /// Reference id in the reporting system
    pub external_ref_id: String,
    /// Subject the units moved for
    pub subject_id: String,
    /// Direction of the movement
    pub direction: Direction,
    /// Reporting source
    pub source: FlowSource,
    /// Unit count
    pub units: u64,
    /// Event time
    pub timestamp: Timestamp,
    /// Actor that reported the flow
    pub operator: String,
    /// Optional free text
    pub notes: Option<String>,
}

impl Measurable for FlowPayload {
    fn magnitude(&self) -> u64 {
        self.units
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Flow tracking domain marker.
pub struct FlowDomain;

/// Registry of flows.
pub type FlowRegistry = ChainedRegistry<FlowDomain>;

impl Domain for FlowDomain {
    type Input = FlowInput;
    type Payload = FlowPayload;
    type Key = String;

    const TAG: &'static str = "flow";
    const ID_PREFIX: &'static str = "flow";

    fn validate(input: FlowInput) -> Result<FlowPayload> {
        require("external_ref_id", &input.external_ref_id)?;
        require("subject_id", &input.subject_id)?;
        require("operator", &input.operator)?;
        let units = non_negative("units", input.units)?;
        let timestamp = positive_timestamp(input.timestamp)?;
        check_notes(&input.notes)?;

        Ok(FlowPayload {
            external_ref_id: input.external_ref_id,
            subject_id: input.subject_id,
            direction: input.direction,
            source: input.source,
            units,
            timestamp,
            operator: input.operator,
            notes: input.notes,
        })
    }

    fn natural_key(payload: &FlowPayload) -> String {
        payload.external_ref_id.clone()
    }

    fn subject(payload: &FlowPayload) -> &str {
        &payload.subject_id
    }

    fn operator(payload: &FlowPayload) -> &str {
        &payload.operator
    }

    fn classification(payload: &FlowPayload) -> &'static str {
        payload.direction.as_str()
    }

    fn timestamp(payload: &FlowPayload) -> Timestamp {
        payload.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorCode;
    use crate::domains::validate::MAX_NOTES_LEN;

    fn valid() -> FlowInput {
        FlowInput::new("ext-1", "player-1", Direction::Inbound, 10, 1_000)
            .with_operator("admin-1")
            .with_source(FlowSource::External)
            .with_notes("weekly reconciliation")
    }

    #[test]
    fn test_validate_ok() {
        let payload = FlowDomain::validate(valid()).unwrap();
        assert_eq!(payload.units, 10);
        assert_eq!(payload.timestamp, Timestamp::from_millis(1_000));
        assert_eq!(payload.source, FlowSource::External);
        assert_eq!(FlowDomain::natural_key(&payload), "ext-1");
        assert_eq!(FlowDomain::classification(&payload), "INBOUND");
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let cases = vec![
            FlowInput { external_ref_id: " ".into(), ..valid() },
            FlowInput { subject_id: String::new(), ..valid() },
            FlowInput { operator: String::new(), ..valid() },
            FlowInput { units: -1, ..valid() },
            FlowInput { timestamp: 0, ..valid() },
            FlowInput { timestamp: -5, ..valid() },
            FlowInput { notes: Some("x".repeat(MAX_NOTES_LEN + 1)), ..valid() },
        ];
        for input in cases {
            let err = FlowDomain::validate(input).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        }
    }

    #[test]
    fn test_zero_units_allowed() {
        let payload = FlowDomain::validate(FlowInput { units: 0, ..valid() }).unwrap();
        assert_eq!(payload.magnitude(), 0);
    }

    #[test]
    fn test_flows_never_terminal() {
        let mut registry = FlowRegistry::new();
        registry.append(valid()).unwrap();
        registry
            .append(FlowInput { external_ref_id: "ext-2".into(), ..valid() })
            .unwrap();
        assert_eq!(registry.history("player-1").len(), 2);
    }
}
