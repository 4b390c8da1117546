//! Immutable hash-linked record.

use crate::chain::hash::{compute_hash, HashPreimage};
use crate::core::{Hash256, RecordId, Result, Timestamp};
use serde::{Deserialize, Serialize};

/// An immutable ledger entry.
///
/// Fields are only readable from outside the crate. A changed fact is a new
/// record about the same subject, never an edit of this one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<P> {
    pub(crate) id: RecordId,
    pub(crate) sequence_number: u64,
    pub(crate) created_at: Timestamp,
    pub(crate) payload: P,
    pub(crate) previous_hash: Hash256,
    pub(crate) record_hash: Hash256,
}

impl<P> Record<P> {
    /// Deterministic record id.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Position in the chain, starting at 1.
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    /// Event time taken from the payload.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Domain payload.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Hash of the preceding record, or the genesis sentinel.
    pub fn previous_hash(&self) -> &Hash256 {
        &self.previous_hash
    }

    /// SHA3-256 over every other field.
    pub fn record_hash(&self) -> &Hash256 {
        &self.record_hash
    }
}

impl<P: Serialize> Record<P> {
    /// Recompute the hash from the stored fields.
    pub fn recompute_hash(&self, domain: &str) -> Result<Hash256> {
        compute_hash(&HashPreimage {
            domain,
            id: &self.id,
            sequence_number: self.sequence_number,
            previous_hash: &self.previous_hash,
            created_at: self.created_at,
            payload: &self.payload,
        })
    }

    /// Whether the stored hash still matches the content.
    pub fn verify_hash(&self, domain: &str) -> Result<bool> {
        Ok(self.recompute_hash(domain)? == self.record_hash)
    }
}
