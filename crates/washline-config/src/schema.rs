//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Service-level settings (backend selection, data directory)
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Queue rules
    #[serde(default)]
    pub queue: RawQueueRules,

    /// Room number policy
    #[serde(default)]
    pub rooms: RawRoomPolicy,
}

/// Service-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Storage backend: "sqlite" (default) or "memory"
    pub backend: Option<String>,

    /// Data directory for the sqlite store
    pub data_dir: Option<PathBuf>,
}

/// Queue rule settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawQueueRules {
    /// Floors that have a laundry room (default [4, 6])
    pub floors: Option<Vec<u8>>,

    /// Max entries one session may hold per calendar date (default 2)
    pub max_entries_per_day: Option<u32>,

    /// Hours after which an untouched entry shows as skipped (default 12)
    pub stale_after_hours: Option<u64>,

    /// Time of day when sign-up for the next day opens (HH:MM, default "22:00")
    pub next_day_opens_at: Option<String>,
}

/// Room number policy settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRoomPolicy {
    /// "flat" (default) or "dorm"
    pub policy: Option<String>,

    /// Flat policy: inclusive lower bound (default 1)
    pub min: Option<u32>,

    /// Flat policy: inclusive upper bound (default 1050)
    pub max: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            config_version = 1

            [service]
            backend = "sqlite"
            data_dir = "/var/lib/washline"

            [queue]
            floors = [4, 6]
            max_entries_per_day = 2
            stale_after_hours = 12
            next_day_opens_at = "22:00"

            [rooms]
            policy = "flat"
            min = 1
            max = 1050
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.config_version, 1);
        assert_eq!(config.queue.floors, Some(vec![4, 6]));
        assert_eq!(config.rooms.policy.as_deref(), Some("flat"));
    }

    #[test]
    fn parse_minimal_config() {
        let config: RawConfig = toml::from_str("config_version = 1").unwrap();
        assert!(config.queue.floors.is_none());
        assert!(config.service.backend.is_none());
    }
}
