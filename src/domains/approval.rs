//! Approval domain.
//!
//! Decision subjects follow `PENDING -> {CONFIRMED | REJECTED}`. The first
//! record for a subject opens it as PENDING; a decision is a second record
//! about the same subject. Both decisions are absorbing, and the opening
//! record is kept unchanged.
//!
//! Two-man rule: an actor that already has a decision on record for a
//! subject (including having opened it) cannot record a different one.

use crate::analytics::{Direction, Measurable};
use crate::chain::{Domain, Record};
use crate::core::{LedgerError, Result, Timestamp};
use crate::domains::validate::{check_notes, non_negative, positive_timestamp, require};
use crate::registry::ChainedRegistry;
use serde::{Deserialize, Serialize};

/// Decision classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Pending,
    Confirmed,
    Rejected,
}

impl Decision {
    /// Wire label, e.g. `CONFIRMED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Pending => "PENDING",
            Decision::Confirmed => "CONFIRMED",
            Decision::Rejected => "REJECTED",
        }
    }

    /// CONFIRMED and REJECTED close the subject.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Pending)
    }
}

/// Caller-supplied decision.
#[derive(Clone, Debug)]
pub struct ApprovalInput {
    /// Subject under approval
    pub subject_id: String,
    /// Actor recording the decision
    pub actor: String,
    /// Decision being recorded
    pub decision: Decision,
    /// Direction of the flow under approval
    pub direction: Direction,
    /// Exposure under approval, in units
    pub exposure_units: i64,
    /// Event time in milliseconds since the epoch
    pub timestamp: i64,
    /// Optional free text
    pub notes: Option<String>,
}

impl ApprovalInput {
    /// Open a subject for approval.
    pub fn request(
        subject_id: &str,
        actor: &str,
        direction: Direction,
        exposure_units: i64,
        timestamp: i64,
    ) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            actor: actor.to_string(),
            decision: Decision::Pending,
            direction,
            exposure_units,
            timestamp,
            notes: None,
        }
    }

    /// Same subject and exposure, decided by another actor.
    pub fn decide(&self, actor: &str, decision: Decision, timestamp: i64) -> Self {
        Self {
            actor: actor.to_string(),
            decision,
            timestamp,
            notes: None,
            ..self.clone()
        }
    }

    /// Attach free-text notes.
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

/// Validated decision stored in a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    /// Subject under approval
    pub subject_id: String,
    /// Actor that recorded the decision
    pub actor: String,
    /// Recorded decision
    pub decision: Decision,
    /// Direction of the flow under approval
    pub direction: Direction,
    /// Exposure under approval, in units
    pub exposure_units: u64,
    /// Event time
    pub timestamp: Timestamp,
    /// Optional free text
    pub notes: Option<String>,
}

impl Measurable for ApprovalPayload {
    /// Exposure is counted once per subject, on the opening record.
    fn magnitude(&self) -> u64 {
        match self.decision {
            Decision::Pending => self.exposure_units,
            Decision::Confirmed | Decision::Rejected => 0,
        }
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

/// Natural key: one record per (subject, actor, decision).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalKey {
    /// Subject under approval
    pub subject_id: String,
    /// Deciding actor
    pub actor: String,
    /// Decision
    pub decision: Decision,
}

/// Approval domain marker.
pub struct ApprovalDomain;

/// Registry of approval decisions.
pub type ApprovalRegistry = ChainedRegistry<ApprovalDomain>;

impl Domain for ApprovalDomain {
    type Input = ApprovalInput;
    type Payload = ApprovalPayload;
    type Key = ApprovalKey;

    const TAG: &'static str = "approval";
    const ID_PREFIX: &'static str = "appr";

    fn validate(input: ApprovalInput) -> Result<ApprovalPayload> {
        require("subject_id", &input.subject_id)?;
        require("actor", &input.actor)?;
        let exposure_units = non_negative("exposure_units", input.exposure_units)?;
        let timestamp = positive_timestamp(input.timestamp)?;
        check_notes(&input.notes)?;

        Ok(ApprovalPayload {
            subject_id: input.subject_id,
            actor: input.actor,
            decision: input.decision,
            direction: input.direction,
            exposure_units,
            timestamp,
            notes: input.notes,
        })
    }

    fn natural_key(payload: &ApprovalPayload) -> ApprovalKey {
        ApprovalKey {
            subject_id: payload.subject_id.clone(),
            actor: payload.actor.clone(),
            decision: payload.decision,
        }
    }

    fn subject(payload: &ApprovalPayload) -> &str {
        &payload.subject_id
    }

    fn operator(payload: &ApprovalPayload) -> &str {
        &payload.actor
    }

    fn classification(payload: &ApprovalPayload) -> &'static str {
        payload.decision.as_str()
    }

    fn timestamp(payload: &ApprovalPayload) -> Timestamp {
        payload.timestamp
    }

    fn is_terminal(payload: &ApprovalPayload) -> bool {
        payload.decision.is_terminal()
    }

    fn conflicts(existing: &ApprovalPayload, candidate: &ApprovalPayload) -> bool {
        existing.actor == candidate.actor && existing.decision != candidate.decision
    }

    fn admit(latest: Option<&Record<ApprovalPayload>>, candidate: &ApprovalPayload) -> Result<()> {
        match (latest, candidate.decision) {
            (None, Decision::Pending) => Ok(()),
            (None, _) => Err(LedgerError::RecordNotFound(candidate.subject_id.clone())),
            (Some(_), Decision::Pending) => Err(LedgerError::invalid(
                "decision",
                format!("subject {} is already pending", candidate.subject_id),
            )),
            (Some(_), _) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorCode;

    fn request() -> ApprovalInput {
        ApprovalInput::request("S", "A", Direction::Outbound, 500, 1_000)
    }

    #[test]
    fn test_open_then_confirm() {
        let mut registry = ApprovalRegistry::new();
        let opened = registry.append(request()).unwrap();
        let confirmed = registry
            .append(request().decide("B", Decision::Confirmed, 2_000))
            .unwrap();

        assert_eq!(opened.payload().decision, Decision::Pending);
        assert_eq!(confirmed.payload().decision, Decision::Confirmed);
        assert_eq!(
            registry.latest_for_subject("S").unwrap().payload().decision,
            Decision::Confirmed
        );
        // The opening record is retained unchanged.
        assert_eq!(registry.get_record(opened.id().as_str()), Some(&opened));
        assert!(registry.verify_chain_integrity().unwrap());
    }

    #[test]
    fn test_same_actor_cannot_decide() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        let before = registry.get_state();

        let err = registry
            .append(request().decide("A", Decision::Confirmed, 2_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConflictingDecision);
        assert_eq!(registry.get_state(), before);
    }

    #[test]
    fn test_decision_after_terminal_rejected() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        registry
            .append(request().decide("B", Decision::Confirmed, 2_000))
            .unwrap();
        let before = registry.get_state();

        let err = registry
            .append(request().decide("C", Decision::Rejected, 3_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyTerminal);
        assert_eq!(registry.get_state(), before);

        let err = registry
            .append(request().decide("B", Decision::Confirmed, 4_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyTerminal);
    }

    #[test]
    fn test_prior_actors_after_terminal() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        registry
            .append(request().decide("B", Decision::Confirmed, 2_000))
            .unwrap();
        let before = registry.get_state();

        let err = registry
            .append(request().decide("A", Decision::Rejected, 3_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyTerminal);

        let err = registry
            .append(request().decide("B", Decision::Rejected, 3_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyTerminal);
        assert_eq!(registry.get_state(), before);
    }

    #[test]
    fn test_exposure_counted_once_per_subject() {
        let mut registry = ApprovalRegistry::new();
        let opened = registry.append(request()).unwrap();
        let decided = registry
            .append(request().decide("B", Decision::Confirmed, 2_000))
            .unwrap();

        assert_eq!(opened.payload().magnitude(), 500);
        assert_eq!(decided.payload().magnitude(), 0);
        assert_eq!(decided.payload().exposure_units, 500);
        assert_eq!(crate::analytics::volume(registry.records()).outbound, 500);
    }

    #[test]
    fn test_rejected_is_absorbing() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        registry
            .append(request().decide("B", Decision::Rejected, 2_000))
            .unwrap();
        let err = registry
            .append(request().decide("C", Decision::Confirmed, 3_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyTerminal);
    }

    #[test]
    fn test_repeated_request_is_duplicate() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        let err = registry
            .append(ApprovalInput { timestamp: 5_000, ..request() })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRecord);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_second_opener_rejected() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        let err = registry
            .append(ApprovalInput { actor: "B".into(), ..request() })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_decision_on_unknown_subject() {
        let mut registry = ApprovalRegistry::new();
        let err = registry
            .append(request().decide("B", Decision::Confirmed, 2_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::RecordNotFound);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subjects_are_independent() {
        let mut registry = ApprovalRegistry::new();
        registry.append(request()).unwrap();
        registry
            .append(request().decide("B", Decision::Confirmed, 2_000))
            .unwrap();
        registry
            .append(ApprovalInput::request("T", "A", Direction::Inbound, 10, 3_000))
            .unwrap();
        registry
            .append(ApprovalInput::request("T", "A", Direction::Inbound, 10, 3_000).decide(
                "C",
                Decision::Rejected,
                4_000,
            ))
            .unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.subjects(), vec!["S", "T"]);
    }

    #[test]
    fn test_validation() {
        let err = ApprovalDomain::validate(ApprovalInput { exposure_units: -1, ..request() })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        let err = ApprovalDomain::validate(ApprovalInput { actor: "".into(), ..request() })
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }
}
