//! Hash-chain primitives.
//!
//! - Domain plug-in trait
//! - SHA3-256 hashing over canonical bytes
//! - Immutable records and the factory that seals them

pub mod domain;
pub mod factory;
pub mod hash;
pub mod record;

pub use domain::Domain;
pub use factory::{Prepared, RecordFactory};
pub use hash::{compute_hash, sha3_256, sha3_256_multi};
pub use record::Record;
