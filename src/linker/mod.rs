//! Reference linker
//!
//! Parallel append-only chain associating primary records with external
//! reference identifiers, without checking that those references exist.

pub mod link;
pub mod shared;
pub mod store;

pub use link::{LinkDomain, LinkInput, LinkKey, LinkPayload, LinkRecord, TargetType};
pub use shared::SharedLinker;
pub use store::Linker;
