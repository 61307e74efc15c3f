//! Validated policy structures

use crate::schema::{RawConfig, RawQueueRules, RawRoomPolicy, RawServiceConfig};
use crate::validation::parse_time;
use chrono::Duration;
use std::path::PathBuf;
use washline_util::{Floor, WallClock};

/// Validated configuration ready for use by the queue service
#[derive(Debug, Clone)]
pub struct Policy {
    pub service: ServiceConfig,
    pub queue: QueueRules,
    pub rooms: RoomPolicy,
}

impl Policy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            queue: QueueRules::from_raw(raw.queue),
            rooms: RoomPolicy::from_raw(raw.rooms),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            queue: QueueRules::default(),
            rooms: RoomPolicy::default(),
        }
    }
}

/// Storage backend selection. Chosen once at process start; the core
/// never branches on which one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Memory,
}

/// Service-level configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub backend: Backend,
    pub data_dir: PathBuf,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        let backend = match raw.backend.as_deref() {
            Some("memory") => Backend::Memory,
            _ => Backend::Sqlite,
        };
        Self {
            backend,
            data_dir: raw
                .data_dir
                .unwrap_or_else(washline_util::data_dir_without_env),
        }
    }

    /// Path of the sqlite database file within the data directory
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("queue.sqlite3")
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

/// Queue rules enforced by the service
#[derive(Debug, Clone)]
pub struct QueueRules {
    /// Floors that have a laundry room
    pub floors: Vec<Floor>,

    /// Max entries one session may hold per calendar date, across floors
    pub max_entries_per_day: u32,

    /// Age at which an entry's effective status becomes skipped
    pub stale_after: Duration,

    /// Time of day when sign-up for the next day opens
    pub next_day_opens_at: WallClock,
}

impl QueueRules {
    fn from_raw(raw: RawQueueRules) -> Self {
        let (hour, minute) = raw
            .next_day_opens_at
            .as_deref()
            .and_then(|s| parse_time(s).ok())
            .unwrap_or((22, 0));

        Self {
            floors: raw
                .floors
                .unwrap_or_else(|| vec![4, 6])
                .into_iter()
                .map(Floor::new)
                .collect(),
            max_entries_per_day: raw.max_entries_per_day.unwrap_or(2),
            stale_after: Duration::hours(raw.stale_after_hours.unwrap_or(12) as i64),
            next_day_opens_at: WallClock::new(hour, minute)
                .unwrap_or(WallClock { hour: 22, minute: 0 }),
        }
    }
}

impl Default for QueueRules {
    fn default() -> Self {
        Self::from_raw(RawQueueRules::default())
    }
}

/// Which room numbers are accepted at sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomPolicy {
    /// A flat inclusive range of room numbers
    Flat { min: u32, max: u32 },

    /// The dormitory layout: floors 2-9 have rooms {F01-F06, F09-F24,
    /// F29-F35}, floor 10 has {1001-1006, 1009-1017}.
    Dorm,
}

impl RoomPolicy {
    fn from_raw(raw: RawRoomPolicy) -> Self {
        match raw.policy.as_deref() {
            Some("dorm") => RoomPolicy::Dorm,
            _ => RoomPolicy::Flat {
                min: raw.min.unwrap_or(1),
                max: raw.max.unwrap_or(1050),
            },
        }
    }

    /// Check whether a parsed room number is accepted
    pub fn contains(&self, room: u32) -> bool {
        match self {
            RoomPolicy::Flat { min, max } => (*min..=*max).contains(&room),
            RoomPolicy::Dorm => {
                for floor in 2u32..=9 {
                    let base = floor * 100;
                    if (base + 1..=base + 6).contains(&room)
                        || (base + 9..=base + 24).contains(&room)
                        || (base + 29..=base + 35).contains(&room)
                    {
                        return true;
                    }
                }
                (1001..=1006).contains(&room) || (1009..=1017).contains(&room)
            }
        }
    }
}

impl Default for RoomPolicy {
    fn default() -> Self {
        Self::from_raw(RawRoomPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dormitory_deployment() {
        let rules = QueueRules::default();
        assert_eq!(rules.floors, vec![Floor::new(4), Floor::new(6)]);
        assert_eq!(rules.max_entries_per_day, 2);
        assert_eq!(rules.stale_after, Duration::hours(12));
        assert_eq!(rules.next_day_opens_at, WallClock::new(22, 0).unwrap());
    }

    #[test]
    fn default_backend_is_sqlite() {
        let service = ServiceConfig::default();
        assert_eq!(service.backend, Backend::Sqlite);
        assert!(service.db_path().ends_with("queue.sqlite3"));
    }

    #[test]
    fn flat_policy_bounds() {
        let policy = RoomPolicy::default();
        assert_eq!(policy, RoomPolicy::Flat { min: 1, max: 1050 });

        assert!(policy.contains(1));
        assert!(policy.contains(1050));
        assert!(!policy.contains(0));
        assert!(!policy.contains(1051));
    }

    #[test]
    fn dorm_policy_floor_ranges() {
        let policy = RoomPolicy::Dorm;

        // Floor 2: 201-206, 209-224, 229-235
        assert!(policy.contains(201));
        assert!(policy.contains(206));
        assert!(!policy.contains(207));
        assert!(!policy.contains(208));
        assert!(policy.contains(209));
        assert!(policy.contains(224));
        assert!(!policy.contains(225));
        assert!(policy.contains(229));
        assert!(policy.contains(235));
        assert!(!policy.contains(236));

        // Floor 10: 1001-1006, 1009-1017
        assert!(policy.contains(1001));
        assert!(policy.contains(1006));
        assert!(!policy.contains(1007));
        assert!(policy.contains(1017));
        assert!(!policy.contains(1018));

        // No floor 1 or 11
        assert!(!policy.contains(101));
        assert!(!policy.contains(1101));
    }

    #[test]
    fn bad_opens_at_falls_back_to_default() {
        // Validation catches this earlier; conversion stays total anyway
        let rules = QueueRules::from_raw(RawQueueRules {
            next_day_opens_at: Some("nonsense".into()),
            ..Default::default()
        });
        assert_eq!(rules.next_day_opens_at, WallClock::new(22, 0).unwrap());
    }
}
