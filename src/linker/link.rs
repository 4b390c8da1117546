//! Link records.
//!
//! A link associates a primary record with an external reference. Links are
//! purely referential: the referenced entity is never looked up.

use crate::chain::{Domain, Record};
use crate::core::{RecordId, Result, Timestamp};
use crate::domains::validate::{positive_timestamp, require};
use serde::{Deserialize, Serialize};

/// Kind of entity a link points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetType {
    Flow,
    Approval,
    Attribution,
    RiskAcknowledgement,
    ExecutionIntent,
    External,
}

impl TargetType {
    /// Wire label, e.g. `ATTRIBUTION`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Flow => "FLOW",
            TargetType::Approval => "APPROVAL",
            TargetType::Attribution => "ATTRIBUTION",
            TargetType::RiskAcknowledgement => "RISK_ACKNOWLEDGEMENT",
            TargetType::ExecutionIntent => "EXECUTION_INTENT",
            TargetType::External => "EXTERNAL",
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied link.
#[derive(Clone, Debug)]
pub struct LinkInput {
    /// Id of the primary record being linked
    pub subject_record_id: String,
    /// Kind of entity referenced
    pub target_type: TargetType,
    /// Id of the referenced entity; never resolved
    pub target_reference_id: String,
    /// Actor creating the link
    pub operator: String,
    /// Event time in milliseconds since the epoch
    pub timestamp: i64,
}

impl LinkInput {
    /// Create a link input.
    pub fn new(
        subject_record_id: &str,
        target_type: TargetType,
        target_reference_id: &str,
        operator: &str,
        timestamp: i64,
    ) -> Self {
        Self {
            subject_record_id: subject_record_id.to_string(),
            target_type,
            target_reference_id: target_reference_id.to_string(),
            operator: operator.to_string(),
            timestamp,
        }
    }
}

/// Validated link stored in a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPayload {
    /// Id of the linked primary record
    pub subject_record_id: RecordId,
    /// Kind of entity referenced
    pub target_type: TargetType,
    /// Id of the referenced entity
    pub target_reference_id: String,
    /// Actor that created the link
    pub operator: String,
    /// Event time
    pub timestamp: Timestamp,
}

/// A sealed link.
pub type LinkRecord = Record<LinkPayload>;

/// Exact-link identity: same subject, target and timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkKey {
    /// Linked primary record
    pub subject_record_id: RecordId,
    /// Kind of entity referenced
    pub target_type: TargetType,
    /// Referenced entity
    pub target_reference_id: String,
    /// Event time
    pub timestamp: Timestamp,
}

/// Link domain marker.
pub struct LinkDomain;

impl Domain for LinkDomain {
    type Input = LinkInput;
    type Payload = LinkPayload;
    type Key = LinkKey;

    const TAG: &'static str = "link";
    const ID_PREFIX: &'static str = "link";

    fn validate(input: LinkInput) -> Result<LinkPayload> {
        require("subject_record_id", &input.subject_record_id)?;
        require("target_reference_id", &input.target_reference_id)?;
        require("operator", &input.operator)?;
        let timestamp = positive_timestamp(input.timestamp)?;

        Ok(LinkPayload {
            subject_record_id: RecordId::new(&input.subject_record_id),
            target_type: input.target_type,
            target_reference_id: input.target_reference_id,
            operator: input.operator,
            timestamp,
        })
    }

    fn natural_key(payload: &LinkPayload) -> LinkKey {
        LinkKey {
            subject_record_id: payload.subject_record_id.clone(),
            target_type: payload.target_type,
            target_reference_id: payload.target_reference_id.clone(),
            timestamp: payload.timestamp,
        }
    }

    fn subject(payload: &LinkPayload) -> &str {
        payload.subject_record_id.as_str()
    }

    fn operator(payload: &LinkPayload) -> &str {
        &payload.operator
    }

    fn classification(payload: &LinkPayload) -> &'static str {
        payload.target_type.as_str()
    }

    fn timestamp(payload: &LinkPayload) -> Timestamp {
        payload.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorCode;

    #[test]
    fn test_validate_link() {
        let payload = LinkDomain::validate(LinkInput::new(
            "flow-1",
            TargetType::Attribution,
            "campaign-9",
            "admin-1",
            1_000,
        ))
        .unwrap();
        assert_eq!(payload.subject_record_id.as_str(), "flow-1");
        assert_eq!(LinkDomain::classification(&payload), "ATTRIBUTION");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        for input in [
            LinkInput::new("", TargetType::Flow, "x", "admin-1", 1_000),
            LinkInput::new("flow-1", TargetType::Flow, "", "admin-1", 1_000),
            LinkInput::new("flow-1", TargetType::Flow, "x", "", 1_000),
            LinkInput::new("flow-1", TargetType::Flow, "x", "admin-1", 0),
        ] {
            let err = LinkDomain::validate(input).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput);
        }
    }
}
