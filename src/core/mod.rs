//! Core utilities and common types for the ledger.

pub mod error;
pub mod types;

pub use error::{ErrorCode, ErrorReport, LedgerError, Result};
pub use types::*;
