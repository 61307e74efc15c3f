//! Repository trait definition

use chrono::NaiveDate;
use washline_api::{NewEntry, QueueEntry, QueueStatus};
use washline_util::{EntryId, Floor, SessionToken};

use crate::StoreResult;

/// Repository contract for queue entries.
///
/// Implemented by the durable sqlite adapter and the in-memory fallback;
/// callers hold it as `Arc<dyn QueueStore>`.
pub trait QueueStore: Send + Sync {
    /// Entries on one floor across the given dates, newest sign-up first
    fn list_for_dates(&self, floor: Floor, dates: &[NaiveDate]) -> StoreResult<Vec<QueueEntry>>;

    /// Entries on one floor for one date, ordered by queue number
    fn list_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<QueueEntry>>;

    /// Queue numbers currently taken in a `(date, floor)` partition
    fn numbers_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<u32>>;

    /// How many entries a session holds on a date, across all floors
    fn count_for_session(&self, session: &SessionToken, date: NaiveDate) -> StoreResult<u32>;

    /// Fetch a single entry; `NotFound` when missing
    fn get(&self, id: &EntryId) -> StoreResult<QueueEntry>;

    /// Insert a new entry. The store assigns `id` and fills `created_at`
    /// when absent. `Conflict` if the `(date, floor, number)` slot is
    /// already taken.
    fn insert(&self, entry: NewEntry) -> StoreResult<QueueEntry>;

    /// Update the stored status. When a session guard is given, only a
    /// row matching both id and owner is touched; `NotFound` otherwise.
    fn update_status(
        &self,
        id: &EntryId,
        status: QueueStatus,
        guard: Option<&SessionToken>,
    ) -> StoreResult<()>;

    /// Delete an entry, with the same guard semantics as `update_status`
    fn delete(&self, id: &EntryId, guard: Option<&SessionToken>) -> StoreResult<()>;

    /// Check if the store is healthy
    fn is_healthy(&self) -> bool;
}
