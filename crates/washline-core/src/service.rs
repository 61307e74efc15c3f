//! The queue orchestrator
//!
//! Composes validation, admission, lifecycle and numbering into the
//! operations the presentation layer calls. All rules run before or
//! after repository calls; the service holds no per-entry state of its
//! own.

use chrono::{DateTime, Duration, Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};
use washline_api::{EntryView, NewEntry, QueueEntry, QueueStatus, QueueWindow};
use washline_config::{Policy, QueueRules, RoomPolicy};
use washline_store::QueueStore;
use washline_util::{EntryId, Floor, SessionToken};

use crate::{
    authorize_mutation, check_signup_window, effective_status, next_number, validate_handle,
    validate_room, Actor, QueueError, QueueResult,
};

/// The queue service
pub struct QueueService {
    rules: QueueRules,
    rooms: RoomPolicy,
    store: Arc<dyn QueueStore>,
}

impl QueueService {
    /// Create a new queue service
    pub fn new(rules: QueueRules, rooms: RoomPolicy, store: Arc<dyn QueueStore>) -> Self {
        info!(
            floors = rules.floors.len(),
            max_entries_per_day = rules.max_entries_per_day,
            "Queue service initialized"
        );

        Self {
            rules,
            rooms,
            store,
        }
    }

    /// Create a queue service from a validated policy
    pub fn from_policy(policy: &Policy, store: Arc<dyn QueueStore>) -> Self {
        Self::new(policy.queue.clone(), policy.rooms.clone(), store)
    }

    /// Get the active queue rules
    pub fn rules(&self) -> &QueueRules {
        &self.rules
    }

    /// The 3-day rolling window for the main page: entries for
    /// `{anchor, anchor-1, anchor-2}` on one floor, newest sign-up first
    /// within each day.
    pub fn list_window(
        &self,
        floor: Floor,
        anchor: NaiveDate,
        viewer: &SessionToken,
        now: DateTime<Local>,
    ) -> QueueResult<QueueWindow> {
        let yesterday = anchor - Duration::days(1);
        let day_before = anchor - Duration::days(2);
        let dates = [anchor, yesterday, day_before];

        let entries = self.store.list_for_dates(floor, &dates)?;

        // Store order is created_at desc; partitioning preserves it
        let mut window = QueueWindow::default();
        for entry in entries {
            let view = self.view_of(&entry, viewer, now);
            if entry.queue_date == anchor {
                window.today.push(view);
            } else if entry.queue_date == yesterday {
                window.yesterday.push(view);
            } else {
                window.day_before.push(view);
            }
        }

        Ok(window)
    }

    /// Administrative view: one day on one floor, by queue number.
    pub fn list_day(&self, floor: Floor, date: NaiveDate) -> QueueResult<Vec<QueueEntry>> {
        Ok(self.store.list_for_day(floor, date)?)
    }

    /// Sign a session up for a date on a floor.
    ///
    /// Fails fast on the first failing check: field validation, then the
    /// floor against the configured list, then the admission window, then
    /// the daily cap. The queue number comes from a fresh read; a
    /// concurrent taker surfaces as a store conflict and is retried
    /// exactly once.
    pub fn add_entry(
        &self,
        floor: Floor,
        date: NaiveDate,
        handle_input: &str,
        room_input: &str,
        session: &SessionToken,
        now: DateTime<Local>,
    ) -> QueueResult<QueueEntry> {
        let telegram_tag = validate_handle(handle_input)?;
        let room = validate_room(room_input, &self.rooms)?;

        if !self.rules.floors.contains(&floor) {
            return Err(QueueError::UnknownFloor(floor));
        }

        check_signup_window(date, now, self.rules.next_day_opens_at)
            .map_err(QueueError::Admission)?;

        let held = self.store.count_for_session(session, date)?;
        if held >= self.rules.max_entries_per_day {
            info!(
                session = %session,
                date = %date,
                held,
                "Sign-up denied: daily limit reached"
            );
            return Err(QueueError::LimitExceeded {
                limit: self.rules.max_entries_per_day,
            });
        }

        match self.try_insert(floor, date, &telegram_tag, &room, session, now) {
            Err(QueueError::Conflict) => {
                warn!(
                    floor = %floor,
                    date = %date,
                    "Queue position taken concurrently, retrying once"
                );
                self.try_insert(floor, date, &telegram_tag, &room, session, now)
            }
            other => other,
        }
    }

    fn try_insert(
        &self,
        floor: Floor,
        date: NaiveDate,
        telegram_tag: &str,
        room: &str,
        session: &SessionToken,
        now: DateTime<Local>,
    ) -> QueueResult<QueueEntry> {
        let numbers = self.store.numbers_for_day(floor, date)?;
        let number = next_number(&numbers);

        let entry = self.store.insert(NewEntry {
            telegram_tag: telegram_tag.to_string(),
            room: room.to_string(),
            floor,
            queue_date: date,
            number,
            status: QueueStatus::Waiting,
            session_id: session.clone(),
            created_at: Some(now),
        })?;

        info!(
            entry_id = %entry.id,
            floor = %floor,
            date = %date,
            number,
            "Entry added"
        );

        Ok(entry)
    }

    /// Change the stored status of an entry.
    ///
    /// The user path requires ownership and a live (non-skipped) entry;
    /// the write goes through the store's conditional guard as well. The
    /// admin path skips ownership but not the freeze.
    pub fn change_status(
        &self,
        id: &EntryId,
        new_status: QueueStatus,
        actor: Actor<'_>,
        now: DateTime<Local>,
    ) -> QueueResult<()> {
        let entry = self.store.get(id)?;
        authorize_mutation(&entry, actor, now, self.rules.stale_after)?;

        let guard = match actor {
            Actor::Session(token) => Some(token),
            Actor::Admin => None,
        };
        self.store.update_status(id, new_status, guard)?;

        info!(entry_id = %id, status = %new_status, "Status changed");
        Ok(())
    }

    /// Remove an entry, with the same gating as a status change.
    pub fn remove_entry(
        &self,
        id: &EntryId,
        actor: Actor<'_>,
        now: DateTime<Local>,
    ) -> QueueResult<()> {
        let entry = self.store.get(id)?;
        authorize_mutation(&entry, actor, now, self.rules.stale_after)?;

        let guard = match actor {
            Actor::Session(token) => Some(token),
            Actor::Admin => None,
        };
        self.store.delete(id, guard)?;

        info!(entry_id = %id, "Entry removed");
        Ok(())
    }

    fn view_of(
        &self,
        entry: &QueueEntry,
        viewer: &SessionToken,
        now: DateTime<Local>,
    ) -> EntryView {
        EntryView {
            id: entry.id.clone(),
            number: entry.number,
            telegram_tag: entry.telegram_tag.clone(),
            room: entry.room.clone(),
            status: effective_status(entry, now, self.rules.stale_after),
            is_mine: &entry.session_id == viewer,
            created_at: entry.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use washline_api::EffectiveStatus;
    use washline_store::{MemoryStore, StoreError, StoreResult};

    /// Delegates to a `MemoryStore` but fails the first `failures`
    /// inserts with a slot conflict.
    struct ConflictingStore {
        inner: MemoryStore,
        failures: Mutex<u32>,
    }

    impl ConflictingStore {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                failures: Mutex::new(failures),
            }
        }
    }

    impl QueueStore for ConflictingStore {
        fn list_for_dates(
            &self,
            floor: Floor,
            dates: &[NaiveDate],
        ) -> StoreResult<Vec<QueueEntry>> {
            self.inner.list_for_dates(floor, dates)
        }

        fn list_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<QueueEntry>> {
            self.inner.list_for_day(floor, date)
        }

        fn numbers_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<u32>> {
            self.inner.numbers_for_day(floor, date)
        }

        fn count_for_session(
            &self,
            session: &SessionToken,
            date: NaiveDate,
        ) -> StoreResult<u32> {
            self.inner.count_for_session(session, date)
        }

        fn get(&self, id: &EntryId) -> StoreResult<QueueEntry> {
            self.inner.get(id)
        }

        fn insert(&self, entry: NewEntry) -> StoreResult<QueueEntry> {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(StoreError::Conflict);
            }
            self.inner.insert(entry)
        }

        fn update_status(
            &self,
            id: &EntryId,
            status: QueueStatus,
            guard: Option<&SessionToken>,
        ) -> StoreResult<()> {
            self.inner.update_status(id, status, guard)
        }

        fn delete(&self, id: &EntryId, guard: Option<&SessionToken>) -> StoreResult<()> {
            self.inner.delete(id, guard)
        }

        fn is_healthy(&self) -> bool {
            self.inner.is_healthy()
        }
    }

    fn service() -> QueueService {
        QueueService::new(
            QueueRules::default(),
            RoomPolicy::default(),
            Arc::new(MemoryStore::new()),
        )
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 28, 12, 0, 0).unwrap()
    }

    fn today() -> NaiveDate {
        noon().date_naive()
    }

    #[test]
    fn add_entry_assigns_first_number() {
        let svc = service();
        let session = SessionToken::new("s-1");

        let entry = svc
            .add_entry(Floor::new(4), today(), "studenta", "205", &session, noon())
            .unwrap();

        assert_eq!(entry.number, 1);
        assert_eq!(entry.status, QueueStatus::Waiting);
        assert_eq!(entry.telegram_tag, "studenta");
        assert_eq!(entry.room, "205");
        assert_eq!(entry.created_at, noon());
    }

    #[test]
    fn add_entry_normalizes_fields() {
        let svc = service();
        let session = SessionToken::new("s-1");

        let entry = svc
            .add_entry(
                Floor::new(4),
                today(),
                " @StudentA ",
                "0205",
                &session,
                noon(),
            )
            .unwrap();

        assert_eq!(entry.telegram_tag, "studenta");
        assert_eq!(entry.room, "205");
    }

    #[test]
    fn add_entry_fails_fast_on_validation() {
        let svc = service();
        let session = SessionToken::new("s-1");

        let err = svc
            .add_entry(Floor::new(4), today(), "ab", "205", &session, noon())
            .unwrap_err();
        assert!(matches!(err, QueueError::Validation(_)));

        let err = svc
            .add_entry(Floor::new(4), today(), "studenta", "9999", &session, noon())
            .unwrap_err();
        assert!(matches!(err, QueueError::Validation(_)));
    }

    #[test]
    fn add_entry_rejects_unconfigured_floor() {
        let svc = service();
        let session = SessionToken::new("s-1");

        // Default floors are 4 and 6
        let err = svc
            .add_entry(Floor::new(5), today(), "studenta", "205", &session, noon())
            .unwrap_err();
        assert!(matches!(err, QueueError::UnknownFloor(f) if f == Floor::new(5)));

        let err = svc
            .add_entry(Floor::new(99), today(), "studenta", "205", &session, noon())
            .unwrap_err();
        assert!(matches!(err, QueueError::UnknownFloor(_)));
    }

    #[test]
    fn add_entry_enforces_admission_window() {
        let svc = service();
        let session = SessionToken::new("s-1");
        let tomorrow = today() + Duration::days(1);

        let err = svc
            .add_entry(Floor::new(4), tomorrow, "studenta", "205", &session, noon())
            .unwrap_err();
        assert!(matches!(
            err,
            QueueError::Admission(washline_api::DenyReason::TomorrowLocked)
        ));

        let evening = Local.with_ymd_and_hms(2026, 8, 28, 22, 0, 0).unwrap();
        svc.add_entry(Floor::new(4), tomorrow, "studenta", "205", &session, evening)
            .unwrap();
    }

    #[test]
    fn daily_cap_counts_across_floors() {
        let svc = service();
        let session = SessionToken::new("s-1");

        svc.add_entry(Floor::new(4), today(), "studenta", "205", &session, noon())
            .unwrap();
        svc.add_entry(Floor::new(6), today(), "studenta", "205", &session, noon())
            .unwrap();

        let err = svc
            .add_entry(Floor::new(4), today(), "studenta", "205", &session, noon())
            .unwrap_err();
        assert!(matches!(err, QueueError::LimitExceeded { limit: 2 }));
    }

    #[test]
    fn numbers_increase_per_partition() {
        let svc = service();

        let a = svc
            .add_entry(
                Floor::new(4),
                today(),
                "studenta",
                "205",
                &SessionToken::new("s-1"),
                noon(),
            )
            .unwrap();
        let b = svc
            .add_entry(
                Floor::new(4),
                today(),
                "studentb",
                "206",
                &SessionToken::new("s-2"),
                noon(),
            )
            .unwrap();
        let c = svc
            .add_entry(
                Floor::new(6),
                today(),
                "studentc",
                "605",
                &SessionToken::new("s-3"),
                noon(),
            )
            .unwrap();

        assert_eq!(a.number, 1);
        assert_eq!(b.number, 2);
        assert_eq!(c.number, 1); // separate floor partition
    }

    #[test]
    fn change_status_requires_ownership() {
        let svc = service();
        let owner = SessionToken::new("s-1");
        let stranger = SessionToken::new("s-2");

        let entry = svc
            .add_entry(Floor::new(4), today(), "studenta", "205", &owner, noon())
            .unwrap();

        let err = svc
            .change_status(
                &entry.id,
                QueueStatus::Finished,
                Actor::Session(&stranger),
                noon(),
            )
            .unwrap_err();
        assert!(matches!(err, QueueError::NotOwner));

        svc.change_status(
            &entry.id,
            QueueStatus::Finished,
            Actor::Session(&owner),
            noon(),
        )
        .unwrap();
    }

    #[test]
    fn change_status_frozen_after_staleness() {
        let svc = service();
        let owner = SessionToken::new("s-1");

        let entry = svc
            .add_entry(Floor::new(4), today(), "studenta", "205", &owner, noon())
            .unwrap();

        let much_later = noon() + Duration::hours(13);
        let err = svc
            .change_status(
                &entry.id,
                QueueStatus::InProgress,
                Actor::Session(&owner),
                much_later,
            )
            .unwrap_err();
        assert!(matches!(err, QueueError::FrozenBySkip));
    }

    #[test]
    fn admin_changes_any_live_entry() {
        let svc = service();
        let owner = SessionToken::new("s-1");

        let entry = svc
            .add_entry(Floor::new(4), today(), "studenta", "205", &owner, noon())
            .unwrap();

        svc.change_status(&entry.id, QueueStatus::InProgress, Actor::Admin, noon())
            .unwrap();

        let fetched = svc.list_day(Floor::new(4), today()).unwrap();
        assert_eq!(fetched[0].status, QueueStatus::InProgress);
    }

    #[test]
    fn remove_entry_same_gating() {
        let svc = service();
        let owner = SessionToken::new("s-1");
        let stranger = SessionToken::new("s-2");

        let entry = svc
            .add_entry(Floor::new(4), today(), "studenta", "205", &owner, noon())
            .unwrap();

        assert!(matches!(
            svc.remove_entry(&entry.id, Actor::Session(&stranger), noon())
                .unwrap_err(),
            QueueError::NotOwner
        ));

        let stale = noon() + Duration::hours(12);
        assert!(matches!(
            svc.remove_entry(&entry.id, Actor::Session(&owner), stale)
                .unwrap_err(),
            QueueError::FrozenBySkip
        ));

        svc.remove_entry(&entry.id, Actor::Session(&owner), noon())
            .unwrap();
        assert!(matches!(
            svc.change_status(&entry.id, QueueStatus::Finished, Actor::Admin, noon())
                .unwrap_err(),
            QueueError::NotFound
        ));
    }

    #[test]
    fn slot_conflict_is_retried_once() {
        let svc = QueueService::new(
            QueueRules::default(),
            RoomPolicy::default(),
            Arc::new(ConflictingStore::new(1)),
        );

        let entry = svc
            .add_entry(
                Floor::new(4),
                today(),
                "studenta",
                "205",
                &SessionToken::new("s-1"),
                noon(),
            )
            .unwrap();
        assert_eq!(entry.number, 1);
    }

    #[test]
    fn repeated_conflict_surfaces() {
        let svc = QueueService::new(
            QueueRules::default(),
            RoomPolicy::default(),
            Arc::new(ConflictingStore::new(2)),
        );

        let err = svc
            .add_entry(
                Floor::new(4),
                today(),
                "studenta",
                "205",
                &SessionToken::new("s-1"),
                noon(),
            )
            .unwrap_err();
        assert!(matches!(err, QueueError::Conflict));
    }

    #[test]
    fn missing_entry_is_not_found() {
        let svc = service();
        let err = svc
            .change_status(
                &EntryId::new(),
                QueueStatus::Finished,
                Actor::Admin,
                noon(),
            )
            .unwrap_err();
        assert!(matches!(err, QueueError::NotFound));
    }

    #[test]
    fn list_window_groups_and_marks_ownership() {
        let svc = service();
        let mine = SessionToken::new("s-1");
        let theirs = SessionToken::new("s-2");

        // An entry for today and one left from yesterday
        let yesterday_noon = noon() - Duration::days(1);
        svc.add_entry(
            Floor::new(4),
            today() - Duration::days(1),
            "studentb",
            "206",
            &theirs,
            yesterday_noon,
        )
        .unwrap();
        svc.add_entry(Floor::new(4), today(), "studenta", "205", &mine, noon())
            .unwrap();

        let window = svc
            .list_window(Floor::new(4), today(), &mine, noon())
            .unwrap();

        assert_eq!(window.today.len(), 1);
        assert_eq!(window.yesterday.len(), 1);
        assert!(window.day_before.is_empty());

        assert!(window.today[0].is_mine);
        assert!(!window.yesterday[0].is_mine);

        // Yesterday's entry is 25 hours old by now: shown as skipped
        assert_eq!(window.today[0].status, EffectiveStatus::Waiting);
        assert_eq!(window.yesterday[0].status, EffectiveStatus::Skipped);
    }

    #[test]
    fn list_window_newest_first_within_day() {
        let svc = service();

        for (handle, minutes) in [("studenta", 0), ("studentb", 10), ("studentc", 20)] {
            svc.add_entry(
                Floor::new(4),
                today(),
                handle,
                "205",
                &SessionToken::new(handle),
                noon() + Duration::minutes(minutes),
            )
            .unwrap();
        }

        let viewer = SessionToken::new("viewer");
        let window = svc
            .list_window(Floor::new(4), today(), &viewer, noon() + Duration::hours(1))
            .unwrap();

        let tags: Vec<&str> = window
            .today
            .iter()
            .map(|v| v.telegram_tag.as_str())
            .collect();
        assert_eq!(tags, vec!["studentc", "studentb", "studenta"]);
    }
}
