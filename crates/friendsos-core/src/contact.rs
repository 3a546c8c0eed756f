// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emergency contacts resolved by the escalation notifier.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How urgently a contact should be reached.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ContactPriority {
    High,
    #[default]
    Medium,
    Low,
}

/// A person who is alerted when a check-in escalates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub priority: ContactPriority,
}

impl Contact {
    /// The address a dispatch backend should use, preferring a phone number.
    pub fn address(&self) -> Option<&str> {
        self.phone.as_deref().or(self.email.as_deref())
    }
}
