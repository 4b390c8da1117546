//! Chained registry
//!
//! Append-only record store for one domain:
//! - Idempotent insertion by natural key
//! - Conflict and terminal-state rules
//! - Chain integrity verification

pub mod chained;
pub mod filter;
pub mod shared;

pub use chained::{ChainedRegistry, RegistryState};
pub use filter::RecordFilter;
pub use shared::SharedRegistry;
