//! SQLite-based store implementation

use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn};
use washline_api::{NewEntry, QueueEntry, QueueStatus};
use washline_util::{format_day, parse_day, EntryId, Floor, SessionToken};

use crate::{QueueStore, StoreError, StoreResult};

/// SQLite-based queue store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS queue_entries (
                id TEXT PRIMARY KEY,
                telegram_tag TEXT NOT NULL,
                room TEXT NOT NULL,
                floor INTEGER NOT NULL,
                queue_date TEXT NOT NULL,
                number INTEGER NOT NULL,
                status TEXT NOT NULL,
                session_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Turns the read-then-insert numbering race into a visible
            -- insert failure instead of a silent duplicate.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_slot
                ON queue_entries(queue_date, floor, number);

            CREATE INDEX IF NOT EXISTS idx_queue_day
                ON queue_entries(queue_date, floor);
            CREATE INDEX IF NOT EXISTS idx_queue_session
                ON queue_entries(session_id, queue_date);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

fn invalid_row(index: usize, message: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, message.into())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<QueueEntry> {
    let id_str: String = row.get(0)?;
    let telegram_tag: String = row.get(1)?;
    let room: String = row.get(2)?;
    let floor: i64 = row.get(3)?;
    let date_str: String = row.get(4)?;
    let number: i64 = row.get(5)?;
    let status_str: String = row.get(6)?;
    let session_id: String = row.get(7)?;
    let created_str: String = row.get(8)?;

    // A row that fails to decode is corruption, not a value to patch over
    let id = EntryId::parse(&id_str).ok_or_else(|| invalid_row(0, "malformed entry id"))?;
    let queue_date =
        parse_day(&date_str).ok_or_else(|| invalid_row(4, "malformed queue date"))?;
    let status = status_str
        .parse::<QueueStatus>()
        .map_err(|_| invalid_row(6, "unknown status"))?;
    let created_at = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| invalid_row(8, "malformed timestamp"))?;

    Ok(QueueEntry {
        id,
        telegram_tag,
        room,
        floor: Floor::new(floor as u8),
        queue_date,
        number: number as u32,
        status,
        session_id: SessionToken::new(session_id),
        created_at,
    })
}

const ENTRY_COLUMNS: &str =
    "id, telegram_tag, room, floor, queue_date, number, status, session_id, created_at";

impl QueueStore for SqliteStore {
    fn list_for_dates(&self, floor: Floor, dates: &[NaiveDate]) -> StoreResult<Vec<QueueEntry>> {
        if dates.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.lock().unwrap();

        let placeholders = vec!["?"; dates.len()].join(", ");
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries
             WHERE floor = ? AND queue_date IN ({placeholders})
             ORDER BY created_at DESC"
        );

        let mut args: Vec<String> = vec![floor.as_u8().to_string()];
        args.extend(dates.iter().map(|d| format_day(*d)));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), entry_from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn list_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<QueueEntry>> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM queue_entries
             WHERE floor = ? AND queue_date = ?
             ORDER BY number ASC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![floor.as_u8() as i64, format_day(date)],
            entry_from_row,
        )?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn numbers_for_day(&self, floor: Floor, date: NaiveDate) -> StoreResult<Vec<u32>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT number FROM queue_entries WHERE floor = ? AND queue_date = ?",
        )?;
        let rows = stmt.query_map(params![floor.as_u8() as i64, format_day(date)], |row| {
            let n: i64 = row.get(0)?;
            Ok(n as u32)
        })?;

        let mut numbers = Vec::new();
        for row in rows {
            numbers.push(row?);
        }
        Ok(numbers)
    }

    fn count_for_session(&self, session: &SessionToken, date: NaiveDate) -> StoreResult<u32> {
        let conn = self.conn.lock().unwrap();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM queue_entries WHERE session_id = ? AND queue_date = ?",
            params![session.as_str(), format_day(date)],
            |row| row.get(0),
        )?;

        Ok(count as u32)
    }

    fn get(&self, id: &EntryId) -> StoreResult<QueueEntry> {
        let conn = self.conn.lock().unwrap();

        let sql = format!("SELECT {ENTRY_COLUMNS} FROM queue_entries WHERE id = ?");
        let entry = conn.query_row(&sql, [id.to_string()], entry_from_row)?;
        Ok(entry)
    }

    fn insert(&self, entry: NewEntry) -> StoreResult<QueueEntry> {
        let conn = self.conn.lock().unwrap();

        let id = EntryId::new();
        let created_at = entry.created_at.unwrap_or_else(washline_util::now);

        // Stored in UTC with fixed-width fractional seconds so that text
        // order matches chronological order across timezone offsets
        let created_text = created_at
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Nanos, true);

        conn.execute(
            "INSERT INTO queue_entries
                 (id, telegram_tag, room, floor, queue_date, number, status, session_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id.to_string(),
                entry.telegram_tag,
                entry.room,
                entry.floor.as_u8() as i64,
                format_day(entry.queue_date),
                entry.number as i64,
                entry.status.as_str(),
                entry.session_id.as_str(),
                created_text,
            ],
        )?;

        debug!(
            entry_id = %id,
            floor = %entry.floor,
            date = %entry.queue_date,
            number = entry.number,
            "Entry inserted"
        );

        Ok(QueueEntry {
            id,
            telegram_tag: entry.telegram_tag,
            room: entry.room,
            floor: entry.floor,
            queue_date: entry.queue_date,
            number: entry.number,
            status: entry.status,
            session_id: entry.session_id,
            created_at,
        })
    }

    fn update_status(
        &self,
        id: &EntryId,
        status: QueueStatus,
        guard: Option<&SessionToken>,
    ) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let affected = match guard {
            Some(session) => conn.execute(
                "UPDATE queue_entries SET status = ? WHERE id = ? AND session_id = ?",
                params![status.as_str(), id.to_string(), session.as_str()],
            )?,
            None => conn.execute(
                "UPDATE queue_entries SET status = ? WHERE id = ?",
                params![status.as_str(), id.to_string()],
            )?,
        };

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        debug!(entry_id = %id, status = %status, "Status updated");
        Ok(())
    }

    fn delete(&self, id: &EntryId, guard: Option<&SessionToken>) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();

        let affected = match guard {
            Some(session) => conn.execute(
                "DELETE FROM queue_entries WHERE id = ? AND session_id = ?",
                params![id.to_string(), session.as_str()],
            )?,
            None => conn.execute(
                "DELETE FROM queue_entries WHERE id = ?",
                [id.to_string()],
            )?,
        };

        if affected == 0 {
            return Err(StoreError::NotFound);
        }

        debug!(entry_id = %id, "Entry deleted");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}
