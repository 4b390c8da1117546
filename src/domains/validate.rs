//! Shared structural validation for domain inputs.

use crate::core::{LedgerError, Result, Timestamp};

/// Maximum length of free-text notes.
pub const MAX_NOTES_LEN: usize = 2_000;

/// Fail with `INVALID_INPUT` when a required field is blank.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::invalid(field, "required"));
    }
    Ok(())
}

/// Accept a strictly positive millisecond timestamp.
pub fn positive_timestamp(value: i64) -> Result<Timestamp> {
    if value <= 0 {
        return Err(LedgerError::invalid(
            "timestamp",
            "must be a strictly positive integer",
        ));
    }
    Ok(Timestamp::from_millis(value))
}

/// Accept a non-negative count as `u64`.
pub fn non_negative(field: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| LedgerError::invalid(field, "must be non-negative"))
}

/// Bound the length of optional notes.
pub fn check_notes(notes: &Option<String>) -> Result<()> {
    match notes {
        Some(text) if text.chars().count() > MAX_NOTES_LEN => Err(LedgerError::invalid(
            "notes",
            format!("longer than {MAX_NOTES_LEN} characters"),
        )),
        _ => Ok(()),
    }
}
