//! Thread-safe registry handle.
//!
//! One lock per registry instance. Appends hold the write lock for the whole
//! read-head, seal, write-head sequence; reads take the read lock and hand
//! back owned copies.

use crate::chain::{Domain, Record};
use crate::core::{LedgerError, Result};
use crate::registry::chained::{ChainedRegistry, RegistryState};
use crate::registry::filter::RecordFilter;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [`ChainedRegistry`] behind a single `RwLock`.
pub struct SharedRegistry<D: Domain> {
    inner: RwLock<ChainedRegistry<D>>,
}

impl<D: Domain> SharedRegistry<D> {
    /// Create an empty shared registry.
    pub fn new() -> Self {
        Self::from_registry(ChainedRegistry::new())
    }

    /// Wrap an existing registry.
    pub fn from_registry(registry: ChainedRegistry<D>) -> Self {
        Self {
            inner: RwLock::new(registry),
        }
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, ChainedRegistry<D>>> {
        self.inner
            .read()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, ChainedRegistry<D>>> {
        self.inner
            .write()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }

    /// Append under the write lock.
    pub fn append(&self, input: D::Input) -> Result<Record<D::Payload>> {
        self.write_guard()?.append(input)
    }

    /// Run a read-only closure against the registry.
    pub fn read<R>(&self, f: impl FnOnce(&ChainedRegistry<D>) -> R) -> Result<R> {
        let guard = self.read_guard()?;
        Ok(f(&guard))
    }

    /// Owned copy of a record by id.
    pub fn get_record(&self, id: &str) -> Result<Option<Record<D::Payload>>> {
        self.read(|r| r.get_record(id).cloned())
    }

    /// Owned copies of the records matching a filter.
    pub fn query(&self, filter: &RecordFilter) -> Result<Vec<Record<D::Payload>>> {
        self.read(|r| r.query(filter).into_iter().cloned().collect())
    }

    /// Verify the chain under the read lock.
    pub fn verify_chain_integrity(&self) -> Result<bool> {
        self.read_guard()?.verify_chain_integrity()
    }

    /// Counter snapshot.
    pub fn get_state(&self) -> Result<RegistryState> {
        self.read(|r| r.get_state())
    }

    /// Owned copy of every record, in insertion order.
    pub fn snapshot(&self) -> Result<Vec<Record<D::Payload>>> {
        self.read(|r| r.records().to_vec())
    }

    /// Unwrap the inner registry.
    pub fn into_inner(self) -> Result<ChainedRegistry<D>> {
        self.inner
            .into_inner()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }
}

impl<D: Domain> Default for SharedRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}
