//! Configuration validation

use crate::schema::RawConfig;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Unknown storage backend: {0}")]
    UnknownBackend(String),

    #[error("Floor list cannot be empty")]
    NoFloors,

    #[error("Duplicate floor: {0}")]
    DuplicateFloor(u8),

    #[error("max_entries_per_day must be at least 1")]
    ZeroEntryCap,

    #[error("stale_after_hours must be at least 1")]
    ZeroStaleness,

    #[error("Invalid time format '{value}': {message}")]
    InvalidTimeFormat { value: String, message: String },

    #[error("Unknown room policy: {0}")]
    UnknownRoomPolicy(String),

    #[error("Flat room range is inverted: min {min} > max {max}")]
    InvertedRoomRange { min: u32, max: u32 },
}

/// Validate a raw configuration, collecting every error rather than
/// stopping at the first.
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(backend) = &config.service.backend {
        match backend.as_str() {
            "sqlite" | "memory" => {}
            other => errors.push(ValidationError::UnknownBackend(other.to_string())),
        }
    }

    if let Some(floors) = &config.queue.floors {
        if floors.is_empty() {
            errors.push(ValidationError::NoFloors);
        }
        let mut seen = HashSet::new();
        for floor in floors {
            if !seen.insert(floor) {
                errors.push(ValidationError::DuplicateFloor(*floor));
            }
        }
    }

    if config.queue.max_entries_per_day == Some(0) {
        errors.push(ValidationError::ZeroEntryCap);
    }

    if config.queue.stale_after_hours == Some(0) {
        errors.push(ValidationError::ZeroStaleness);
    }

    if let Some(opens_at) = &config.queue.next_day_opens_at {
        if let Err(e) = parse_time(opens_at) {
            errors.push(ValidationError::InvalidTimeFormat {
                value: opens_at.clone(),
                message: e,
            });
        }
    }

    match config.rooms.policy.as_deref() {
        None | Some("flat") => {
            let min = config.rooms.min.unwrap_or(1);
            let max = config.rooms.max.unwrap_or(1050);
            if min > max {
                errors.push(ValidationError::InvertedRoomRange { min, max });
            }
        }
        Some("dorm") => {}
        Some(other) => errors.push(ValidationError::UnknownRoomPolicy(other.to_string())),
    }

    errors
}

/// Parse HH:MM time format
pub fn parse_time(s: &str) -> Result<(u8, u8), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err("Expected HH:MM format".into());
    }

    let hour: u8 = parts[0].parse().map_err(|_| "Invalid hour".to_string())?;
    let minute: u8 = parts[1].parse().map_err(|_| "Invalid minute".to_string())?;

    if hour >= 24 {
        return Err("Hour must be 0-23".into());
    }
    if minute >= 60 {
        return Err("Minute must be 0-59".into());
    }

    Ok((hour, minute))
}
