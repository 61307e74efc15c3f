//! Validation of the two user-supplied sign-up fields
//!
//! Pure functions; no I/O. The room policy comes from configuration.

use thiserror::Error;
use washline_config::RoomPolicy;

/// Minimum Telegram handle length
pub const HANDLE_MIN_LEN: usize = 5;

/// Maximum Telegram handle length
pub const HANDLE_MAX_LEN: usize = 32;

/// Why a sign-up field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Handle must be at least 5 characters")]
    TooShort,

    #[error("Handle must be at most 32 characters")]
    TooLong,

    #[error("Only latin letters, digits and underscore are allowed")]
    InvalidCharacters,

    #[error("Not a valid room number")]
    OutOfRange,
}

/// Normalize and validate a Telegram handle.
///
/// Accepts input with or without a leading `@`. On success returns the
/// lower-cased handle without the `@`.
pub fn validate_handle(input: &str) -> Result<String, FieldError> {
    let raw = input.trim();
    let value = raw.strip_prefix('@').unwrap_or(raw);

    if value.is_empty() {
        return Err(FieldError::EmptyInput);
    }
    // Length in characters, so non-ASCII input fails on length before
    // the charset check
    let char_count = value.chars().count();
    if char_count < HANDLE_MIN_LEN {
        return Err(FieldError::TooShort);
    }
    if char_count > HANDLE_MAX_LEN {
        return Err(FieldError::TooLong);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(FieldError::InvalidCharacters);
    }

    Ok(value.to_ascii_lowercase())
}

/// Validate a room number against the configured policy.
///
/// On success returns the canonical integer form (leading zeros dropped
/// by the integer round-trip).
pub fn validate_room(input: &str, policy: &RoomPolicy) -> Result<String, FieldError> {
    let raw = input.trim();

    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::EmptyInput);
    }

    // All digits but too large for u32 is a range problem, not a parse one
    let number: u32 = raw.parse().map_err(|_| FieldError::OutOfRange)?;

    if !policy.contains(number) {
        return Err(FieldError::OutOfRange);
    }

    Ok(number.to_string())
}
