//! Error types for queue operations

use thiserror::Error;
use washline_api::{DenyReason, InvalidStatus};
use washline_store::StoreError;
use washline_util::Floor;

use crate::FieldError;

/// Everything a queue operation can fail with. Returned as values from
/// the orchestrator; the presentation layer renders them.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error(transparent)]
    Validation(#[from] FieldError),

    #[error("Sign-up denied: {0:?}")]
    Admission(DenyReason),

    #[error("No laundry room on floor {0}")]
    UnknownFloor(Floor),

    #[error("Entry belongs to another session")]
    NotOwner,

    #[error("Entry went stale and can no longer be changed")]
    FrozenBySkip,

    #[error(transparent)]
    InvalidTarget(#[from] InvalidStatus),

    #[error("Daily limit of {limit} entries reached")]
    LimitExceeded { limit: u32 },

    #[error("Entry not found")]
    NotFound,

    #[error("Queue position was taken concurrently")]
    Conflict,

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for QueueError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => QueueError::NotFound,
            StoreError::Conflict => QueueError::Conflict,
            other => QueueError::Storage(other),
        }
    }
}

pub type QueueResult<T> = Result<T, QueueError>;
