//! Core queue rules for washline
//!
//! This crate is the heart of washline, containing:
//! - Field validation (Telegram handle, room number)
//! - The admission window (which dates accept sign-ups, and when)
//! - The entry lifecycle (effective status, ownership, the 12-hour freeze)
//! - Queue numbering within a `(date, floor)` partition
//! - The `QueueService` orchestrator tying the rules to the repository
//!
//! Every time-sensitive operation takes an explicit `now` so tests can
//! simulate arbitrary instants; callers pass `washline_util::now()`.

mod admission;
mod error;
mod lifecycle;
mod numbering;
mod service;
mod validate;

pub use admission::*;
pub use error::*;
pub use lifecycle::*;
pub use numbering::*;
pub use service::*;
pub use validate::*;
