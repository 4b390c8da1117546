//! Compliance helpers that sit outside the ledger core.

pub mod boundary;

pub use boundary::{
    scan, BoundaryGuard, BoundaryViolation, ViolationSeverity, DEFAULT_FORBIDDEN_KEYWORDS,
};
