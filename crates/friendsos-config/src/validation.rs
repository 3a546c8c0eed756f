// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: positive engine defaults,
//! a usable database path, well-formed contact entries.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::FriendsosConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &FriendsosConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.app.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "app.log_level `{}` is not one of {}",
            config.app.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.app.user_id.trim().is_empty() {
        fail("app.user_id must not be empty".to_string());
    }

    if config.checkin.default_max_notifications == 0 {
        fail("checkin.default_max_notifications must be at least 1".to_string());
    }

    if config.checkin.default_escalation_delay_mins == 0 {
        fail("checkin.default_escalation_delay_mins must be at least 1".to_string());
    }

    if config.checkin.poll_interval_secs == 0 {
        fail("checkin.poll_interval_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let mut seen = HashSet::new();
    for (i, contact) in config.contacts.iter().enumerate() {
        if contact.id.trim().is_empty() {
            fail(format!("contacts[{i}].id must not be empty"));
        } else if !seen.insert(contact.id.as_str()) {
            fail(format!("duplicate contact id `{}` in [[contacts]]", contact.id));
        }
        if contact.phone.is_none() && contact.email.is_none() {
            fail(format!(
                "contacts[{i}] (`{}`) needs a phone or an email",
                contact.id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
