//! Thread-safe linker handle.
//!
//! Same locking model as the shared registry: one `RwLock` per linker,
//! held for the whole append, with reads returning owned copies.

use crate::core::{LedgerError, Result};
use crate::linker::link::{LinkInput, LinkRecord, TargetType};
use crate::linker::store::Linker;
use crate::registry::RegistryState;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [`Linker`] behind a single `RwLock`.
#[derive(Default)]
pub struct SharedLinker {
    inner: RwLock<Linker>,
}

impl SharedLinker {
    /// Create an empty shared linker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing linker.
    pub fn from_linker(linker: Linker) -> Self {
        Self {
            inner: RwLock::new(linker),
        }
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, Linker>> {
        self.inner
            .read()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Linker>> {
        self.inner
            .write()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }

    /// Append a link under the write lock.
    pub fn link(&self, input: LinkInput) -> Result<LinkRecord> {
        self.write_guard()?.link(input)
    }

    /// Run a read-only closure against the linker.
    pub fn read<R>(&self, f: impl FnOnce(&Linker) -> R) -> Result<R> {
        let guard = self.read_guard()?;
        Ok(f(&guard))
    }

    /// Owned copy of a link by id.
    pub fn get_link(&self, id: &str) -> Result<Option<LinkRecord>> {
        self.read(|l| l.get_link(id).cloned())
    }

    /// Owned copies of the links attached to a primary record.
    pub fn links_for(&self, subject_record_id: &str) -> Result<Vec<LinkRecord>> {
        self.read(|l| l.links_for(subject_record_id).into_iter().cloned().collect())
    }

    /// Owned copies of the links pointing at an external reference.
    pub fn links_to(
        &self,
        target_type: TargetType,
        target_reference_id: &str,
    ) -> Result<Vec<LinkRecord>> {
        self.read(|l| {
            l.links_to(target_type, target_reference_id)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Verify the link chain under the read lock.
    pub fn verify_chain_integrity(&self) -> Result<bool> {
        self.read_guard()?.verify_chain_integrity()
    }

    /// Counter snapshot.
    pub fn get_state(&self) -> Result<RegistryState> {
        self.read(|l| l.get_state())
    }

    /// Unwrap the inner linker.
    pub fn into_inner(self) -> Result<Linker> {
        self.inner
            .into_inner()
            .map_err(|e| LedgerError::LockPoisoned(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorCode;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_concurrent_links_keep_chain_valid() {
        let shared = Arc::new(SharedLinker::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for i in 0..20 {
                        let input = LinkInput::new(
                            &format!("flow-{t}"),
                            TargetType::Attribution,
                            &format!("campaign-{i}"),
                            "admin-1",
                            1_000 + i,
                        );
                        shared.link(input).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = shared.get_state().unwrap();
        assert_eq!(state.record_count, 80);
        assert_eq!(state.current_sequence, 80);
        assert!(shared.verify_chain_integrity().unwrap());
        assert_eq!(shared.links_for("flow-2").unwrap().len(), 20);
        assert_eq!(
            shared
                .links_to(TargetType::Attribution, "campaign-3")
                .unwrap()
                .len(),
            4
        );
    }

    #[test]
    fn test_duplicate_link_rejected_under_lock() {
        let shared = SharedLinker::new();
        let input = LinkInput::new("flow-1", TargetType::External, "ticket-1", "admin-1", 1_000);
        let record = shared.link(input.clone()).unwrap();
        let err = shared.link(input).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRecord);

        assert_eq!(shared.get_link(record.id().as_str()).unwrap(), Some(record));
        assert_eq!(shared.into_inner().unwrap().len(), 1);
    }
}
