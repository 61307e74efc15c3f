//! Entry lifecycle: effective status and mutation gating
//!
//! An entry's stored status is overridden by `Skipped` for display once
//! it is older than the configured staleness age; a skipped entry is
//! frozen for everyone, admins included. Ownership is a plain token
//! comparison.

use chrono::{DateTime, Duration, Local};
use washline_api::{EffectiveStatus, QueueEntry};
use washline_util::SessionToken;

use crate::{QueueError, QueueResult};

/// Who is asking for a mutation
#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    /// An ordinary user, identified by their session token
    Session(&'a SessionToken),
    /// The administrative path; bypasses the ownership check
    Admin,
}

/// Status as it should be displayed: `Skipped` once the entry is older
/// than `stale_after`, the stored status otherwise.
pub fn effective_status(
    entry: &QueueEntry,
    now: DateTime<Local>,
    stale_after: Duration,
) -> EffectiveStatus {
    if now.signed_duration_since(entry.created_at) >= stale_after {
        EffectiveStatus::Skipped
    } else {
        entry.status.into()
    }
}

/// Gate a status change or deletion. Checked before any repository
/// write; the repository re-checks ownership via its conditional guard.
pub fn authorize_mutation(
    entry: &QueueEntry,
    actor: Actor<'_>,
    now: DateTime<Local>,
    stale_after: Duration,
) -> QueueResult<()> {
    if let Actor::Session(token) = actor {
        if *token != entry.session_id {
            return Err(QueueError::NotOwner);
        }
    }

    if effective_status(entry, now, stale_after).is_skipped() {
        return Err(QueueError::FrozenBySkip);
    }

    Ok(())
}
