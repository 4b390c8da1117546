//! # chainledger - Hash-chained append-only ledger
//!
//! An in-memory ledger where every record commits to its predecessor:
//! - **chain**: record factory and SHA3-256 sealing
//! - **registry**: append-only chains with integrity verification
//! - **linker**: a parallel chain of references to external entities
//! - **analytics**: deterministic volume, ratio and distribution metrics
//! - **views**: read-only reports over a registry and its linker
//!
//! ## Quick Start
//!
//! ```rust
//! use chainledger::analytics::Direction;
//! use chainledger::domains::flow::{FlowInput, FlowRegistry};
//!
//! let mut registry = FlowRegistry::new();
//! let input = FlowInput::new("ext-1", "player-1", Direction::Inbound, 100, 1_700_000_000_000)
//!     .with_operator("admin-1");
//! let record = registry.append(input).unwrap();
//! assert_eq!(record.sequence_number(), 1);
//! assert!(registry.verify_chain_integrity().unwrap());
//! ```

pub mod analytics;
pub mod chain;
pub mod compliance;
pub mod config;
pub mod core;
pub mod domains;
pub mod linker;
pub mod registry;
pub mod telemetry;
pub mod views;

pub use crate::chain::{Domain, Record, RecordFactory};
pub use crate::config::LedgerConfig;
pub use crate::core::{
    ErrorCode, ErrorReport, Hash256, LedgerError, RecordId, Result, Timestamp, GENESIS_HASH,
};
pub use crate::linker::{Linker, SharedLinker};
pub use crate::registry::{ChainedRegistry, RecordFilter, SharedRegistry};
pub use crate::views::LedgerView;
