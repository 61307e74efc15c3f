//! In-memory fallback store
//!
//! Used when no durable backend is configured. Keeps the same contract
//! as the sqlite adapter, including the uniqueness guarantee on
//! `(queue_date, floor, number)`.

use chrono::NaiveDate;
use std::sync::Mutex;
use tracing::debug;
use washline_api::{NewEntry, QueueEntry, QueueStatus};
use washline_util::{EntryId, Floor, SessionToken};

use crate::{QueueStore, StoreError, StoreResult};

/// In-memory queue store
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<QueueEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueueStore for MemoryStore {
    fn list_for_dates(&self, floor: Floor, dates: &[NaiveDate]) -> StoreResult<Vec<QueueEntry>> {
        let entries = self.entries.lock().unwrap();
        let mut found: Vec<QueueEntry> = entries
            .iter()
            .filter(|e| e.floor == floor && dates.contains(&e.queue_date))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    fn list_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<QueueEntry>> {
        let entries = self.entries.lock().unwrap();
        let mut found: Vec<QueueEntry> = entries
            .iter()
            .filter(|e| e.floor == floor && e.queue_date == date)
            .cloned()
            .collect();
        found.sort_by_key(|e| e.number);
        Ok(found)
    }

    fn numbers_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<u32>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| e.floor == floor && e.queue_date == date)
            .map(|e| e.number)
            .collect())
    }

    fn count_for_session(&self, session: &SessionToken, date: NaiveDate) -> StoreResult<u32> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .iter()
            .filter(|e| &e.session_id == session && e.queue_date == date)
            .count() as u32)
    }

    fn get(&self, id: &EntryId) -> StoreResult<QueueEntry> {
        let entries = self.entries.lock().unwrap();
        entries
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn insert(&self, entry: NewEntry) -> StoreResult<QueueEntry> {
        let mut entries = self.entries.lock().unwrap();

        let slot_taken = entries.iter().any(|e| {
            e.queue_date == entry.queue_date && e.floor == entry.floor && e.number == entry.number
        });
        if slot_taken {
            return Err(StoreError::Conflict);
        }

        let stored = QueueEntry {
            id: EntryId::new(),
            telegram_tag: entry.telegram_tag,
            room: entry.room,
            floor: entry.floor,
            queue_date: entry.queue_date,
            number: entry.number,
            status: entry.status,
            session_id: entry.session_id,
            created_at: entry.created_at.unwrap_or_else(washline_util::now),
        };

        debug!(
            entry_id = %stored.id,
            floor = %stored.floor,
            date = %stored.queue_date,
            number = stored.number,
            "Entry inserted"
        );

        entries.push(stored.clone());
        Ok(stored)
    }

    fn update_status(
        &self,
        id: &EntryId,
        status: QueueStatus,
        guard: Option<&SessionToken>,
    ) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap();

        let entry = entries
            .iter_mut()
            .find(|e| &e.id == id && guard.is_none_or(|s| &e.session_id == s))
            .ok_or(StoreError::NotFound)?;

        entry.status = status;
        debug!(entry_id = %id, status = %status, "Status updated");
        Ok(())
    }

    fn delete(&self, id: &EntryId, guard: Option<&SessionToken>) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap();

        let before = entries.len();
        entries.retain(|e| !(&e.id == id && guard.is_none_or(|s| &e.session_id == s)));
        if entries.len() == before {
            return Err(StoreError::NotFound);
        }

        debug!(entry_id = %id, "Entry deleted");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        !self.entries.is_poisoned()
    }
}
