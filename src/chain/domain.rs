//! Domain plug-in trait.
//!
//! Every business domain (flow tracking, approvals, links, ...) runs on the
//! same chained registry. A domain supplies its input/payload/key types,
//! validation, the natural-key extractor, and the optional terminal and
//! conflict rules.

use crate::chain::record::Record;
use crate::core::{Result, Timestamp};
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// A ledger domain.
pub trait Domain {
    /// Caller-supplied input, validated by [`Domain::validate`].
    type Input;
    /// Validated payload stored inside each record.
    type Payload: Clone + Debug + PartialEq + Serialize;
    /// Natural key used for idempotency checks.
    type Key: Clone + Debug + Eq + Hash + Serialize;

    /// Domain tag mixed into every record hash.
    const TAG: &'static str;
    /// Prefix of generated record ids.
    const ID_PREFIX: &'static str;

    /// Structural validation. Fails with `INVALID_INPUT`.
    fn validate(input: Self::Input) -> Result<Self::Payload>;

    /// Natural key of a payload.
    fn natural_key(payload: &Self::Payload) -> Self::Key;

    /// Subject the payload is about. Records sharing a subject form its history.
    fn subject(payload: &Self::Payload) -> &str;

    /// Actor that created the payload.
    fn operator(payload: &Self::Payload) -> &str;

    /// Classification label of the payload (direction, decision, ...).
    fn classification(payload: &Self::Payload) -> &'static str;

    /// Event time of the payload.
    fn timestamp(payload: &Self::Payload) -> Timestamp;

    /// Whether the payload closes its subject.
    fn is_terminal(_payload: &Self::Payload) -> bool {
        false
    }

    /// Whether `candidate` contradicts an `existing` record of the same subject.
    fn conflicts(_existing: &Self::Payload, _candidate: &Self::Payload) -> bool {
        false
    }

    /// Transition check against the subject's latest record, run after the
    /// terminal guard.
    fn admit(_latest: Option<&Record<Self::Payload>>, _candidate: &Self::Payload) -> Result<()> {
        Ok(())
    }
}
