//! Concrete ledger domains.
//!
//! - Flow tracking (idempotent by external reference)
//! - Approvals (PENDING -> CONFIRMED | REJECTED, two-man rule)

pub mod approval;
pub mod flow;
pub mod validate;

pub use approval::{
    ApprovalDomain, ApprovalInput, ApprovalKey, ApprovalPayload, ApprovalRegistry, Decision,
};
pub use flow::{FlowDomain, FlowInput, FlowPayload, FlowRegistry, FlowSource};
