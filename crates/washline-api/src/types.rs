//! Shared types for the washline queue

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use washline_util::{EntryId, Floor, SessionToken};

/// Stored status of a queue entry.
///
/// These are the only statuses a user may set. `Skipped` is never stored;
/// it exists only as a derived [`EffectiveStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    InProgress,
    Finished,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::InProgress => "in_progress",
            QueueStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a status string outside the user-settable set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a settable status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for QueueStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(QueueStatus::Waiting),
            "in_progress" => Ok(QueueStatus::InProgress),
            "finished" => Ok(QueueStatus::Finished),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Status as displayed: the stored status, or `Skipped` once the entry
/// has gone stale. Derived on read, never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveStatus {
    Waiting,
    InProgress,
    Finished,
    Skipped,
}

impl From<QueueStatus> for EffectiveStatus {
    fn from(status: QueueStatus) -> Self {
        match status {
            QueueStatus::Waiting => EffectiveStatus::Waiting,
            QueueStatus::InProgress => EffectiveStatus::InProgress,
            QueueStatus::Finished => EffectiveStatus::Finished,
        }
    }
}

impl EffectiveStatus {
    pub fn is_skipped(&self) -> bool {
        matches!(self, EffectiveStatus::Skipped)
    }
}

/// Why a sign-up for a given date is currently denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The date is already over
    Past,
    /// Tomorrow's queue has not opened yet
    TomorrowLocked,
    /// Further ahead than tomorrow
    TooFarFuture,
}

/// One sign-up record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    /// Normalized Telegram handle, lower-cased, no leading `@`
    pub telegram_tag: String,
    /// Room number in canonical integer form
    pub room: String,
    pub floor: Floor,
    pub queue_date: NaiveDate,
    /// 1-based position within the `(queue_date, floor)` partition
    pub number: u32,
    pub status: QueueStatus,
    /// Owner token, set at creation, immutable
    pub session_id: SessionToken,
    pub created_at: DateTime<Local>,
}

/// Insert shape for a queue entry. The store assigns `id`, and fills
/// `created_at` when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub telegram_tag: String,
    pub room: String,
    pub floor: Floor,
    pub queue_date: NaiveDate,
    pub number: u32,
    pub status: QueueStatus,
    pub session_id: SessionToken,
    pub created_at: Option<DateTime<Local>>,
}

/// View of one entry for UI display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryView {
    pub id: EntryId,
    pub number: u32,
    pub telegram_tag: String,
    pub room: String,
    pub status: EffectiveStatus,
    /// Whether the viewing session owns this entry
    pub is_mine: bool,
    pub created_at: DateTime<Local>,
}

/// The 3-day rolling window shown on the main page, newest sign-up first
/// within each day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueWindow {
    pub today: Vec<EntryView>,
    pub yesterday: Vec<EntryView>,
    pub day_before: Vec<EntryView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for s in [
            QueueStatus::Waiting,
            QueueStatus::InProgress,
            QueueStatus::Finished,
        ] {
            assert_eq!(s.as_str().parse::<QueueStatus>().unwrap(), s);
        }
    }

    #[test]
    fn skipped_is_not_settable() {
        let err = "skipped".parse::<QueueStatus>().unwrap_err();
        assert_eq!(err, InvalidStatus("skipped".into()));

        assert!("done".parse::<QueueStatus>().is_err());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&QueueStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn effective_status_from_stored() {
        assert_eq!(
            EffectiveStatus::from(QueueStatus::Waiting),
            EffectiveStatus::Waiting
        );
        assert!(!EffectiveStatus::from(QueueStatus::Finished).is_skipped());
        assert!(EffectiveStatus::Skipped.is_skipped());
    }

    #[test]
    fn entry_serializes_and_parses() {
        let entry = QueueEntry {
            id: EntryId::new(),
            telegram_tag: "studenta".into(),
            room: "205".into(),
            floor: Floor::new(4),
            queue_date: NaiveDate::from_ymd_opt(2026, 8, 28).unwrap(),
            number: 1,
            status: QueueStatus::Waiting,
            session_id: SessionToken::new("s-1"),
            created_at: Local::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: QueueEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, parsed);
    }
}
