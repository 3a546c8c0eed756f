// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborators shipped with the binary: a dispatch backend that only logs
//! and a reminder surface that writes to the terminal.

use std::io::Write;

use async_trait::async_trait;
use colored::Colorize;
use friendsos_core::{
    AdapterType, Contact, DispatchAdapter, FriendsosError, HealthStatus, MessageId, PluginAdapter,
    ReminderPrompt, ReminderSurface,
};
use tracing::info;

/// Dispatch backend that records each escalation message in the log.
///
/// Stands in for an SMS or push gateway.
pub struct LogDispatch;

#[async_trait]
impl PluginAdapter for LogDispatch {
    fn name(&self) -> &str {
        "log-dispatch"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Dispatch
    }

    async fn health_check(&self) -> Result<HealthStatus, FriendsosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        Ok(())
    }
}

#[async_trait]
impl DispatchAdapter for LogDispatch {
    async fn send(&self, contact: &Contact, message: &str) -> Result<MessageId, FriendsosError> {
        let Some(address) = contact.address() else {
            return Err(FriendsosError::Dispatch {
                contact_id: contact.id.clone(),
                message: "contact has no phone or email".into(),
                source: None,
            });
        };
        let id = MessageId(format!("log-{}", uuid::Uuid::new_v4()));
        info!(
            contact_id = %contact.id,
            address,
            message_id = %id.0,
            text = message,
            "escalation message dispatched"
        );
        Ok(id)
    }
}

/// Reminder surface that prints prompts to stdout and rings the terminal bell.
pub struct TerminalReminder {
    color: bool,
}

impl TerminalReminder {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn render(&self, prompt: &ReminderPrompt) -> String {
        let header = format!("[{}]", prompt.title);
        let header = if self.color {
            header.bold().yellow().to_string()
        } else {
            header
        };
        format!(
            "{header} {}\n  respond with: respond {} safe|help|emergency",
            prompt.body, prompt.check_in_id
        )
    }
}

#[async_trait]
impl PluginAdapter for TerminalReminder {
    fn name(&self) -> &str {
        "terminal-reminder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Reminder
    }

    async fn health_check(&self) -> Result<HealthStatus, FriendsosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        Ok(())
    }
}

#[async_trait]
impl ReminderSurface for TerminalReminder {
    async fn show_prompt(&self, prompt: &ReminderPrompt) -> Result<(), FriendsosError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "\n{}", self.render(prompt))
            .and_then(|()| out.flush())
            .map_err(|e| FriendsosError::Internal(format!("failed to write prompt: {e}")))
    }

    async fn play_cue(&self) -> Result<(), FriendsosError> {
        let mut out = std::io::stdout().lock();
        out.write_all(b"\x07")
            .and_then(|()| out.flush())
            .map_err(|e| FriendsosError::Internal(format!("failed to ring bell: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use friendsos_core::{CheckInId, ContactPriority};

    fn contact(phone: Option<&str>, email: Option<&str>) -> Contact {
        Contact {
            id: "alice".into(),
            name: "Alice".into(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            priority: ContactPriority::High,
        }
    }

    #[tokio::test]
    async fn log_dispatch_returns_fresh_ids() {
        let dispatch = LogDispatch;
        let c = contact(Some("+15550100"), None);
        let a = dispatch.send(&c, "help").await.unwrap();
        let b = dispatch.send(&c, "help").await.unwrap();
        assert_ne!(a, b);
        assert!(a.0.starts_with("log-"));
    }

    #[tokio::test]
    async fn log_dispatch_rejects_unreachable_contacts() {
        let err = LogDispatch
            .send(&contact(None, None), "help")
            .await
            .unwrap_err();
        assert!(matches!(err, FriendsosError::Dispatch { .. }));
    }

    #[test]
    fn plain_prompt_names_the_check_in() {
        let prompt = ReminderPrompt::check_in_required(CheckInId::from("c-1"), "Walking home");
        let text = TerminalReminder::new(false).render(&prompt);
        assert!(text.starts_with("[Check-in Required] Walking home"));
        assert!(text.contains("respond c-1"));
    }
}
