//! Shared types for the washline queue
//!
//! These types cross the boundary between the store adapters, the core
//! service, and whatever presentation layer consumes them. The core never
//! owns a wire protocol; these are plain data.

mod types;

pub use types::*;
