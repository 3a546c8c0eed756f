// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a check-in record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckInId(pub String);

impl CheckInId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckInId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckInId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CheckInId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifier returned by a dispatch backend for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator an adapter provides to the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Store,
    Dispatch,
    Reminder,
}

/// A local, user-facing prompt shown when a check-in is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderPrompt {
    pub check_in_id: CheckInId,
    pub title: String,
    pub body: String,
    /// The prompt stays on screen until the user interacts with it.
    pub require_interaction: bool,
}

impl ReminderPrompt {
    /// The standard "Check-in Required" prompt for a check-in message.
    pub fn check_in_required(check_in_id: CheckInId, body: impl Into<String>) -> Self {
        Self {
            check_in_id,
            title: "Check-in Required".to_string(),
            body: body.into(),
            require_interaction: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn generated_ids_are_unique() {
        let a = CheckInId::generate();
        let b = CheckInId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn check_in_id_serializes_as_plain_string() {
        let id = CheckInId::from("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }

    #[test]
    fn adapter_type_display_and_parse() {
        for variant in [AdapterType::Store, AdapterType::Dispatch, AdapterType::Reminder] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn check_in_required_prompt_requires_interaction() {
        let prompt = ReminderPrompt::check_in_required(CheckInId::from("c1"), "are you ok?");
        assert_eq!(prompt.title, "Check-in Required");
        assert_eq!(prompt.body, "are you ok?");
        assert!(prompt.require_interaction);
    }
}
