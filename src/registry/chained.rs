//! Chained registry.
//!
//! Single source of truth for one domain's records: the ordered record list,
//! its indices, the sequence counter and the head hash. Every rule check runs
//! before the first mutation, so a rejected append leaves the registry
//! exactly as it was.

use crate::chain::hash::{derive_record_id, key_string};
use crate::chain::{Domain, Record, RecordFactory};
use crate::core::{Hash256, LedgerError, RecordId, Result, GENESIS_HASH};
use crate::registry::filter::RecordFilter;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Snapshot of registry counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryState {
    /// Records held
    pub record_count: u64,
    /// Sequence number of the newest record, 0 when empty
    pub current_sequence: u64,
    /// Hash of the newest record, or the genesis hash
    pub head_hash: Hash256,
}

/// Append-only, hash-chained registry for domain `D`.
pub struct ChainedRegistry<D: Domain> {
    records: Vec<Record<D::Payload>>,
    by_id: HashMap<RecordId, usize>,
    by_key: HashMap<D::Key, usize>,
    by_subject: HashMap<String, Vec<usize>>,
    current_sequence: u64,
    head_hash: Hash256,
}

impl<D: Domain> ChainedRegistry<D> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            by_id: HashMap::new(),
            by_key: HashMap::new(),
            by_subject: HashMap::new(),
            current_sequence: 0,
            head_hash: GENESIS_HASH,
        }
    }

    /// Validate, check insertion rules, then seal and append a new record.
    pub fn append(&mut self, input: D::Input) -> Result<Record<D::Payload>> {
        match self.try_append(input) {
            Ok(record) => {
                debug!(
                    domain = D::TAG,
                    sequence = record.sequence_number(),
                    id = %record.id(),
                    "record appended"
                );
                Ok(record)
            }
            Err(err) => {
                warn!(domain = D::TAG, code = %err.code(), error = %err, "append rejected");
                Err(err)
            }
        }
    }

    fn try_append(&mut self, input: D::Input) -> Result<Record<D::Payload>> {
        let prepared = RecordFactory::<D>::prepare(input)?;
        self.check_admission(&prepared.payload, &prepared.key)?;

        let record = RecordFactory::<D>::seal(prepared, self.current_sequence + 1, self.head_hash)?;
        self.commit(record.clone());
        Ok(record)
    }

    /// Read-only insertion rules: duplicate, terminal, conflict, domain transition.
    ///
    /// A closed subject rejects every further record with `ALREADY_TERMINAL`,
    /// whichever actor submits it.
    fn check_admission(&self, payload: &D::Payload, key: &D::Key) -> Result<()> {
        let subject = D::subject(payload);

        if let Some(&index) = self.by_key.get(key) {
            let existing = &self.records[index];
            if !D::is_terminal(existing.payload()) {
                return Err(LedgerError::DuplicateRecord {
                    key: key_string(key),
                    existing_id: existing.id().to_string(),
                });
            }
        }

        let history = self.subject_indices(subject);
        let latest = history.last().map(|&i| &self.records[i]);
        if let Some(latest) = latest {
            if D::is_terminal(latest.payload()) {
                return Err(LedgerError::AlreadyTerminal {
                    subject: subject.to_string(),
                    terminal_id: latest.id().to_string(),
                });
            }
        }

        if let Some(existing) = history
            .iter()
            .map(|&i| &self.records[i])
            .find(|r| D::conflicts(r.payload(), payload))
        {
            return Err(LedgerError::ConflictingDecision {
                subject: subject.to_string(),
                actor: D::operator(payload).to_string(),
                existing_id: existing.id().to_string(),
            });
        }

        D::admit(latest, payload)
    }

    /// Import-time checks for one already-sealed record: its id must be the
    /// one derived from its key and position, its timestamp must match the
    /// payload, and it must pass the same insertion rules as an append.
    fn check_imported(&self, record: &Record<D::Payload>) -> Result<()> {
        let sequence = record.sequence_number();
        let payload = record.payload();
        let key = D::natural_key(payload);

        let expected_id = derive_record_id(D::TAG, D::ID_PREFIX, &key, sequence)?;
        if *record.id() != expected_id || self.by_id.contains_key(record.id().as_str()) {
            return Err(LedgerError::ChainIntegrity {
                sequence,
                reason: format!("record id {} does not match its key", record.id()),
            });
        }

        let created_at = record.created_at();
        if created_at.as_millis() <= 0 || created_at != D::timestamp(payload) {
            return Err(LedgerError::invalid(
                "created_at",
                format!("record {sequence} carries an invalid timestamp"),
            ));
        }

        self.check_admission(payload, &key)
    }

    fn commit(&mut self, record: Record<D::Payload>) {
        let index = self.records.len();
        let key = D::natural_key(record.payload());
        self.by_id.insert(record.id().clone(), index);
        self.by_key.insert(key, index);
        self.by_subject
            .entry(D::subject(record.payload()).to_string())
            .or_default()
            .push(index);
        self.current_sequence = record.sequence_number();
        self.head_hash = *record.record_hash();
        self.records.push(record);
    }

    fn subject_indices(&self, subject: &str) -> &[usize] {
        self.by_subject.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get a record by id.
    pub fn get_record(&self, id: &str) -> Option<&Record<D::Payload>> {
        self.by_id.get(id).map(|&i| &self.records[i])
    }

    /// Get the record currently holding a natural key.
    pub fn get_by_key(&self, key: &D::Key) -> Option<&Record<D::Payload>> {
        self.by_key.get(key).map(|&i| &self.records[i])
    }

    /// Records matching a filter, in insertion order.
    pub fn query(&self, filter: &RecordFilter) -> Vec<&Record<D::Payload>> {
        let candidates: Box<dyn Iterator<Item = &Record<D::Payload>> + '_> = match &filter.subject {
            Some(subject) => Box::new(
                self.subject_indices(subject)
                    .iter()
                    .map(|&i| &self.records[i]),
            ),
            None => Box::new(self.records.iter()),
        };

        candidates
            .filter(|r| filter.matches::<D>(r))
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Every record of a subject, oldest first.
    pub fn history(&self, subject: &str) -> Vec<&Record<D::Payload>> {
        self.subject_indices(subject)
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    /// Current state of a subject: its latest record.
    pub fn latest_for_subject(&self, subject: &str) -> Option<&Record<D::Payload>> {
        self.subject_indices(subject)
            .last()
            .map(|&i| &self.records[i])
    }

    /// Distinct subjects, in order of first appearance.
    pub fn subjects(&self) -> Vec<&str> {
        let mut firsts: Vec<(usize, &str)> = self
            .by_subject
            .iter()
            .filter_map(|(s, idx)| idx.first().map(|&i| (i, s.as_str())))
            .collect();
        firsts.sort_unstable();
        firsts.into_iter().map(|(_, s)| s).collect()
    }

    /// Walk the chain and check sequence, link and hash of every record.
    ///
    /// Returns `Ok(true)` for an intact chain. A broken link or sequence gap
    /// fails with `CHAIN_INTEGRITY_ERROR`; altered content fails with
    /// `HASH_MISMATCH`. Both carry the offending sequence number.
    pub fn verify_chain_integrity(&self) -> Result<bool> {
        let result = verify_records::<D>(&self.records);
        match &result {
            Ok(_) => debug!(domain = D::TAG, records = self.records.len(), "chain verified"),
            Err(err) => warn!(
                domain = D::TAG,
                code = %err.code(),
                error = %err,
                "chain verification failed"
            ),
        }
        result
    }

    /// Counter snapshot.
    pub fn get_state(&self) -> RegistryState {
        RegistryState {
            record_count: self.records.len() as u64,
            current_sequence: self.current_sequence,
            head_hash: self.head_hash,
        }
    }

    /// Hash of the newest record, or the genesis hash.
    pub fn head_hash(&self) -> &Hash256 {
        &self.head_hash
    }

    /// Sequence number of the newest record.
    pub fn current_sequence(&self) -> u64 {
        self.current_sequence
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[Record<D::Payload>] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been appended.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent records, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<&Record<D::Payload>> {
        self.records.iter().rev().take(count).collect()
    }

    /// Export the record list to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.records)?)
    }
}

impl<D: Domain> ChainedRegistry<D>
where
    D::Payload: DeserializeOwned,
{
    /// Rebuild a registry from exported records.
    ///
    /// The chain is verified before any index is built, then every record is
    /// replayed through the insertion rules. A tampered export is rejected.
    pub fn from_records(records: Vec<Record<D::Payload>>) -> Result<Self> {
        verify_records::<D>(&records)?;

        let mut registry = Self::new();
        for record in records {
            registry.check_imported(&record)?;
            registry.commit(record);
        }
        debug!(domain = D::TAG, records = registry.len(), "registry imported");
        Ok(registry)
    }

    /// Import a registry from JSON produced by [`ChainedRegistry::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<Record<D::Payload>> = serde_json::from_str(json)?;
        Self::from_records(records)
    }
}

impl<D: Domain> Default for ChainedRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Chain checks over an ordered record slice.
pub(crate) fn verify_records<D: Domain>(records: &[Record<D::Payload>]) -> Result<bool> {
    let mut expected_prev = GENESIS_HASH;
    for (index, record) in records.iter().enumerate() {
        let expected_seq = index as u64 + 1;
        if record.sequence_number() != expected_seq {
            return Err(LedgerError::ChainIntegrity {
                sequence: record.sequence_number(),
                reason: format!("expected sequence {expected_seq}"),
            });
        }

        if *record.previous_hash() != expected_prev {
            return Err(LedgerError::ChainIntegrity {
                sequence: expected_seq,
                reason: "previous hash link mismatch".into(),
            });
        }

        let computed = record.recompute_hash(D::TAG)?;
        if computed != *record.record_hash() {
            return Err(LedgerError::HashMismatch {
                sequence: expected_seq,
                stored: record.record_hash().to_hex(),
                computed: computed.to_hex(),
            });
        }

        expected_prev = *record.record_hash();
    }
    Ok(true)
}
