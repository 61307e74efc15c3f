//! Shared utilities for washline
//!
//! This crate provides:
//! - ID types (EntryId, SessionToken, Floor)
//! - Wall-clock time helpers (mock-time-aware `now()`, WallClock)
//! - Default paths for config and data directories

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
