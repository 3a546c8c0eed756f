// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine-wide policy knobs.

use std::time::Duration;

use friendsos_config::FriendsosConfig;

/// Defaults and persistence policy applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Prompt cap for check-ins that do not set one.
    pub default_max_notifications: u32,
    /// Escalation delay in minutes for check-ins that do not set one.
    pub default_escalation_delay_mins: u32,
    /// Extra save attempts after a failed persistence write.
    pub persist_retries: u32,
    /// Pause between consecutive escalation sends.
    pub send_spacing: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_max_notifications: 3,
            default_escalation_delay_mins: 5,
            persist_retries: 1,
            send_spacing: Duration::from_millis(100),
        }
    }
}

impl From<&FriendsosConfig> for EngineSettings {
    fn from(config: &FriendsosConfig) -> Self {
        Self {
            default_max_notifications: config.checkin.default_max_notifications,
            default_escalation_delay_mins: config.checkin.default_escalation_delay_mins,
            persist_retries: config.checkin.persist_retries,
            send_spacing: Duration::from_millis(config.dispatch.send_spacing_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_agree_with_config_defaults() {
        let from_config = EngineSettings::from(&FriendsosConfig::default());
        assert_eq!(from_config, EngineSettings::default());
    }
}
