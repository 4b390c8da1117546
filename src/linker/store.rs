//! Linker.
//!
//! A second append-only chain, parallel to a registry, holding link records.
//! Indexed forward by subject record and in reverse by (target type, target
//! reference).

use crate::core::{RecordId, Result};
use crate::linker::link::{LinkDomain, LinkInput, LinkRecord, TargetType};
use crate::registry::{ChainedRegistry, RecordFilter, RegistryState};
use std::collections::HashMap;

/// Reference-only link chain.
#[derive(Default)]
pub struct Linker {
    chain: ChainedRegistry<LinkDomain>,
    by_target: HashMap<(TargetType, String), Vec<RecordId>>,
}

impl Linker {
    /// Create an empty linker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link. An exact repeat fails with `DUPLICATE_RECORD`.
    pub fn link(&mut self, input: LinkInput) -> Result<LinkRecord> {
        let record = self.chain.append(input)?;
        self.index(&record);
        Ok(record)
    }

    fn index(&mut self, record: &LinkRecord) {
        let payload = record.payload();
        self.by_target
            .entry((payload.target_type, payload.target_reference_id.clone()))
            .or_default()
            .push(record.id().clone());
    }

    /// Get a link by id.
    pub fn get_link(&self, id: &str) -> Option<&LinkRecord> {
        self.chain.get_record(id)
    }

    /// Links attached to a primary record, in insertion order.
    pub fn links_for(&self, subject_record_id: &str) -> Vec<&LinkRecord> {
        self.chain.history(subject_record_id)
    }

    /// Reverse lookup: links pointing at an external reference.
    pub fn links_to(&self, target_type: TargetType, target_reference_id: &str) -> Vec<&LinkRecord> {
        self.by_target
            .get(&(target_type, target_reference_id.to_string()))
            .map(|ids| ids.iter().filter_map(|id| self.chain.get_record(id.as_str())).collect())
            .unwrap_or_default()
    }

    /// Links matching a filter, in insertion order.
    pub fn query(&self, filter: &RecordFilter) -> Vec<&LinkRecord> {
        self.chain.query(filter)
    }

    /// Walk the link chain; same checks as a registry.
    pub fn verify_chain_integrity(&self) -> Result<bool> {
        self.chain.verify_chain_integrity()
    }

    /// Counter snapshot of the link chain.
    pub fn get_state(&self) -> RegistryState {
        self.chain.get_state()
    }

    /// All links in insertion order.
    pub fn records(&self) -> &[LinkRecord] {
        self.chain.records()
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether no link has been recorded.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Export the link chain to JSON.
    pub fn to_json(&self) -> Result<String> {
        self.chain.to_json()
    }

    /// Import a verified link chain and rebuild the reverse index.
    pub fn from_json(json: &str) -> Result<Self> {
        let chain = ChainedRegistry::<LinkDomain>::from_json(json)?;
        let mut linker = Self {
            chain,
            by_target: HashMap::new(),
        };
        let records: Vec<LinkRecord> = linker.chain.records().to_vec();
        for record in &records {
            linker.index(record);
        }
        Ok(linker)
    }
}
