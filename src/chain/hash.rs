//! Hash-chain utilities.
//!
//! SHA3-256 over a canonical bincode encoding. Every chain in the crate uses
//! the same function.

use crate::core::{Hash256, RecordId, Result, Timestamp};
use serde::Serialize;
use sha3::{Digest, Sha3_256};
use uuid::Uuid;

const RECORD_DOMAIN_SEPARATOR: &[u8] = b"chainledger-record-v1:";

/// Namespace for deterministic record ids.
const RECORD_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c1e_2b0a_9d4f_5e37_8a61_c2f0_4b9d_13e5);

/// Compute SHA3-256 hash of data.
pub fn sha3_256(data: &[u8]) -> Hash256 {
    sha3_256_multi(&[data])
}

/// Compute SHA3-256 hash of multiple data chunks.
pub fn sha3_256_multi(chunks: &[&[u8]]) -> Hash256 {
    let mut hasher = Sha3_256::new();
    for chunk in chunks {
        hasher.update(chunk);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    Hash256::new(bytes)
}

/// Every record field except the hash itself, in a fixed order.
#[derive(Serialize)]
pub struct HashPreimage<'a, P: Serialize> {
    /// Domain tag
    pub domain: &'a str,
    /// Record id
    pub id: &'a RecordId,
    /// Position in the chain
    pub sequence_number: u64,
    /// Hash of the preceding record
    pub previous_hash: &'a Hash256,
    /// Event time
    pub created_at: Timestamp,
    /// Domain payload
    pub payload: &'a P,
}

/// Canonical bytes of a preimage.
pub fn canonical_bytes<P: Serialize>(preimage: &HashPreimage<'_, P>) -> Result<Vec<u8>> {
    Ok(bincode::serialize(preimage)?)
}

/// Record hash over a canonical preimage.
pub fn compute_hash<P: Serialize>(preimage: &HashPreimage<'_, P>) -> Result<Hash256> {
    let bytes = canonical_bytes(preimage)?;
    Ok(sha3_256_multi(&[RECORD_DOMAIN_SEPARATOR, &bytes]))
}

/// Deterministic record id derived from the natural key and sequence number.
pub fn derive_record_id<K: Serialize>(
    domain: &str,
    prefix: &str,
    key: &K,
    sequence_number: u64,
) -> Result<RecordId> {
    let bytes = bincode::serialize(&(domain, key, sequence_number))?;
    let uuid = Uuid::new_v5(&RECORD_ID_NAMESPACE, &bytes);
    Ok(RecordId::new(&format!("{prefix}-{uuid}")))
}

/// Human-readable rendering of a natural key, used in error details.
pub fn key_string<K: Serialize>(key: &K) -> String {
    serde_json::to_string(key).unwrap_or_else(|_| "<unprintable>".to_string())
}
