//! Record factory.
//!
//! Validates domain input and seals it into one hash-linked record.

use crate::chain::domain::Domain;
use crate::chain::hash::{compute_hash, derive_record_id, HashPreimage};
use crate::chain::record::Record;
use crate::core::{Hash256, LedgerError, Result};
use std::marker::PhantomData;

/// Validated input awaiting a chain position.
#[derive(Clone, Debug)]
pub struct Prepared<D: Domain> {
    /// Validated payload
    pub payload: D::Payload,
    /// Natural key derived from the payload
    pub key: D::Key,
}

/// Produces records for domain `D`.
pub struct RecordFactory<D: Domain> {
    _domain: PhantomData<D>,
}

impl<D: Domain> RecordFactory<D> {
    /// Validate input and derive its natural key. Touches no chain state.
    pub fn prepare(input: D::Input) -> Result<Prepared<D>> {
        let payload = D::validate(input)?;
        let key = D::natural_key(&payload);
        Ok(Prepared { payload, key })
    }

    /// Natural key of a payload.
    pub fn compute_natural_key(payload: &D::Payload) -> D::Key {
        D::natural_key(payload)
    }

    /// Give a prepared payload its chain position and hash.
    pub fn seal(
        prepared: Prepared<D>,
        sequence_number: u64,
        previous_hash: Hash256,
    ) -> Result<Record<D::Payload>> {
        if sequence_number == 0 {
            return Err(LedgerError::invalid(
                "sequence_number",
                "sequence numbers start at 1",
            ));
        }

        let id = derive_record_id(D::TAG, D::ID_PREFIX, &prepared.key, sequence_number)?;
        let created_at = D::timestamp(&prepared.payload);
        let record_hash = compute_hash(&HashPreimage {
            domain: D::TAG,
            id: &id,
            sequence_number,
            previous_hash: &previous_hash,
            created_at,
            payload: &prepared.payload,
        })?;

        Ok(Record {
            id,
            sequence_number,
            created_at,
            payload: prepared.payload,
            previous_hash,
            record_hash,
        })
    }

    /// Validate and seal in one step.
    pub fn create_record(
        input: D::Input,
        sequence_number: u64,
        previous_hash: Hash256,
    ) -> Result<Record<D::Payload>> {
        Self::seal(Self::prepare(input)?, sequence_number, previous_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Direction;
    use crate::core::{ErrorCode, GENESIS_HASH};
    use crate::domains::flow::{FlowDomain, FlowInput, FlowPayload, FlowSource};

    fn input(reference: &str, units: i64, timestamp: i64) -> FlowInput {
        FlowInput::new(reference, "player-1", Direction::Inbound, units, timestamp)
            .with_source(FlowSource::Manual)
            .with_operator("admin-1")
    }

    fn create(input: FlowInput, sequence: u64, previous: Hash256) -> Result<Record<FlowPayload>> {
        RecordFactory::<FlowDomain>::create_record(input, sequence, previous)
    }

    #[test]
    fn test_create_record_deterministic() {
        let a = create(input("ext-1", 100, 1_000), 1, GENESIS_HASH).unwrap();
        let b = create(input("ext-1", 100, 1_000), 1, GENESIS_HASH).unwrap();
        assert_eq!(a.id(), b.id());
        assert_eq!(a.record_hash(), b.record_hash());
        assert_eq!(a.previous_hash(), &GENESIS_HASH);
        assert_eq!(a.record_hash().to_hex().len(), 64);
    }

    #[test]
    fn test_hash_depends_on_position() {
        let a = create(input("ext-1", 100, 1_000), 1, GENESIS_HASH).unwrap();
        let b = create(input("ext-1", 100, 1_000), 1, Hash256::new([9u8; 32])).unwrap();
        assert_ne!(a.record_hash(), b.record_hash());
    }

    #[test]
    fn test_created_record_verifies() {
        let record = create(input("ext-1", 5, 1_000), 3, GENESIS_HASH).unwrap();
        assert!(record.verify_hash("flow").unwrap());
        assert!(!record.verify_hash("approval").unwrap());
    }

    #[test]
    fn test_invalid_input_rejected() {
        let err = create(input("ext-1", -1, 1_000), 1, GENESIS_HASH).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);

        let err = create(input("ext-1", 1, 0), 1, GENESIS_HASH).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn test_zero_sequence_rejected() {
        let err = create(input("ext-1", 1, 1_000), 0, GENESIS_HASH).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }
}
