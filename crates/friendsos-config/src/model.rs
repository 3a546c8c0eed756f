// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the FriendSOS check-in engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently ignored.

use friendsos_core::{Contact, ContactPriority};
use serde::{Deserialize, Serialize};

/// Top-level FriendSOS configuration.
///
/// Every section is optional and defaults to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FriendsosConfig {
    /// Application identity and logging.
    #[serde(default)]
    pub app: AppConfig,

    /// Engine-wide check-in defaults and persistence policy.
    #[serde(default)]
    pub checkin: CheckInConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound escalation delivery settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Emergency contacts referenced by check-ins.
    #[serde(default)]
    pub contacts: Vec<ContactConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Identifier stamped on check-ins created from the shell.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            user_id: default_user_id(),
        }
    }
}

fn default_app_name() -> String {
    "friendsos".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_id() -> String {
    "local-user".to_string()
}

/// Check-in engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CheckInConfig {
    /// Prompt cap applied when a check-in does not set its own.
    #[serde(default = "default_max_notifications")]
    pub default_max_notifications: u32,

    /// Minutes after a prompt before escalation, when not set per check-in.
    #[serde(default = "default_escalation_delay_mins")]
    pub default_escalation_delay_mins: u32,

    /// Extra attempts made when a persistence write fails.
    #[serde(default = "default_persist_retries")]
    pub persist_retries: u32,

    /// How often `serve` logs the query surface, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            default_max_notifications: default_max_notifications(),
            default_escalation_delay_mins: default_escalation_delay_mins(),
            persist_retries: default_persist_retries(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_max_notifications() -> u32 {
    3
}

fn default_escalation_delay_mins() -> u32 {
    5
}

fn default_persist_retries() -> u32 {
    1
}

fn default_poll_interval_secs() -> u64 {
    60
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("friendsos").join("friendsos.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("friendsos.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Pause between consecutive contact sends, in milliseconds.
    #[serde(default = "default_send_spacing_ms")]
    pub send_spacing_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_spacing_ms: default_send_spacing_ms(),
        }
    }
}

fn default_send_spacing_ms() -> u64 {
    100
}

/// One `[[contacts]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContactConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub priority: ContactPriority,
}

impl From<&ContactConfig> for Contact {
    fn from(c: &ContactConfig) -> Self {
        Contact {
            id: c.id.clone(),
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
            priority: c.priority,
        }
    }
}

impl FriendsosConfig {
    /// The configured contacts as domain values.
    pub fn contacts(&self) -> Vec<Contact> {
        self.contacts.iter().map(Contact::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_constants() {
        let config = FriendsosConfig::default();
        assert_eq!(config.checkin.default_max_notifications, 3);
        assert_eq!(config.checkin.default_escalation_delay_mins, 5);
        assert_eq!(config.checkin.persist_retries, 1);
        assert_eq!(config.dispatch.send_spacing_ms, 100);
        assert!(config.storage.database_path.ends_with("friendsos.db"));
        assert!(config.contacts.is_empty());
    }

    #[test]
    fn contacts_array_deserializes() {
        let toml_str = r#"
[[contacts]]
id = "alice"
name = "Alice"
phone = "+15550100"
priority = "high"

[[contacts]]
id = "bob"
name = "Bob"
email = "bob@example.com"
"#;
        let config: FriendsosConfig = toml::from_str(toml_str).unwrap();
        let contacts = config.contacts();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].priority, ContactPriority::High);
        assert_eq!(contacts[1].priority, ContactPriority::Medium);
        assert_eq!(contacts[1].address(), Some("bob@example.com"));
    }
}
