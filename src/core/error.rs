//! Error types for the ledger.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Stable, machine-readable error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidInput,
    DuplicateRecord,
    ConflictingDecision,
    AlreadyTerminal,
    RecordNotFound,
    ChainIntegrityError,
    HashMismatch,
    SerializationError,
    ConfigError,
    LockPoisoned,
}

impl ErrorCode {
    /// The wire form of the code, e.g. `DUPLICATE_RECORD`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::DuplicateRecord => "DUPLICATE_RECORD",
            ErrorCode::ConflictingDecision => "CONFLICTING_DECISION",
            ErrorCode::AlreadyTerminal => "ALREADY_TERMINAL",
            ErrorCode::RecordNotFound => "RECORD_NOT_FOUND",
            ErrorCode::ChainIntegrityError => "CHAIN_INTEGRITY_ERROR",
            ErrorCode::HashMismatch => "HASH_MISMATCH",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::LockPoisoned => "LOCK_POISONED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in ledger operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    // Validation errors
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    // Insertion rule errors
    #[error("Duplicate record for natural key {key} (existing record {existing_id})")]
    DuplicateRecord { key: String, existing_id: String },

    #[error("Actor {actor} already recorded a different decision on {subject}")]
    ConflictingDecision {
        subject: String,
        actor: String,
        existing_id: String,
    },

    #[error("Subject {subject} is already terminal (record {terminal_id})")]
    AlreadyTerminal { subject: String, terminal_id: String },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    // Verification errors
    #[error("Chain integrity violated at sequence {sequence}: {reason}")]
    ChainIntegrity { sequence: u64, reason: String },

    #[error("Hash mismatch at sequence {sequence}: stored {stored}, computed {computed}")]
    HashMismatch {
        sequence: u64,
        stored: String,
        computed: String,
    },

    // Ambient errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl LedgerError {
    /// Shorthand for a structural validation failure.
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// The stable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::InvalidInput { .. } => ErrorCode::InvalidInput,
            LedgerError::DuplicateRecord { .. } => ErrorCode::DuplicateRecord,
            LedgerError::ConflictingDecision { .. } => ErrorCode::ConflictingDecision,
            LedgerError::AlreadyTerminal { .. } => ErrorCode::AlreadyTerminal,
            LedgerError::RecordNotFound(_) => ErrorCode::RecordNotFound,
            LedgerError::ChainIntegrity { .. } => ErrorCode::ChainIntegrityError,
            LedgerError::HashMismatch { .. } => ErrorCode::HashMismatch,
            LedgerError::Serialization(_) => ErrorCode::SerializationError,
            LedgerError::Config(_) => ErrorCode::ConfigError,
            LedgerError::LockPoisoned(_) => ErrorCode::LockPoisoned,
        }
    }

    /// Structured details for the error, as a JSON object.
    pub fn details(&self) -> serde_json::Value {
        match self {
            LedgerError::InvalidInput { field, reason } => {
                json!({ "field": field, "reason": reason })
            }
            LedgerError::DuplicateRecord { key, existing_id } => {
                json!({ "key": key, "existingId": existing_id })
            }
            LedgerError::ConflictingDecision {
                subject,
                actor,
                existing_id,
            } => json!({ "subject": subject, "actor": actor, "existingId": existing_id }),
            LedgerError::AlreadyTerminal {
                subject,
                terminal_id,
            } => json!({ "subject": subject, "terminalId": terminal_id }),
            LedgerError::RecordNotFound(id) => json!({ "id": id }),
            LedgerError::ChainIntegrity { sequence, reason } => {
                json!({ "sequenceNumber": sequence, "reason": reason })
            }
            LedgerError::HashMismatch {
                sequence,
                stored,
                computed,
            } => json!({ "sequenceNumber": sequence, "stored": stored, "computed": computed }),
            LedgerError::Serialization(msg)
            | LedgerError::Config(msg)
            | LedgerError::LockPoisoned(msg) => json!({ "message": msg }),
        }
    }

    /// The `{code, message, details}` form handed to external collaborators.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Sequence number carried by verification failures.
    pub fn sequence(&self) -> Option<u64> {
        match self {
            LedgerError::ChainIntegrity { sequence, .. }
            | LedgerError::HashMismatch { sequence, .. } => Some(*sequence),
            _ => None,
        }
    }
}

/// Serializable error report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Structured fields of the error
    pub details: serde_json::Value,
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(err: bincode::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
