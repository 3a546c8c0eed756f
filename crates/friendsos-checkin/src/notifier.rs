// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation fan-out to a check-in's emergency contacts.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use friendsos_core::{
    CheckIn, CheckInId, ContactDirectory, DispatchAdapter, MessageId, ResponseStatus,
};
use serde::Serialize;
use tracing::{info, warn};

/// Why a check-in escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTrigger {
    /// A prompt went unanswered past its escalation delay.
    MissedCheckIn,
    /// The user answered `help` or `emergency`.
    Distress(ResponseStatus),
}

/// A message accepted by the dispatch backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub contact_id: String,
    pub message_id: MessageId,
}

/// A contact that could not be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub contact_id: String,
    pub reason: String,
}

/// Per-contact outcome of one escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscalationReport {
    pub check_in_id: CheckInId,
    pub trigger: EscalationTrigger,
    pub message: String,
    pub escalated_at: DateTime<Utc>,
    pub delivered: Vec<Delivery>,
    pub failed: Vec<DispatchFailure>,
}

impl EscalationReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Sends a failed check-in's escalation text to each of its contacts.
pub struct EscalationNotifier {
    dispatch: Arc<dyn DispatchAdapter>,
    directory: Arc<dyn ContactDirectory>,
    send_spacing: Duration,
}

impl EscalationNotifier {
    pub fn new(
        dispatch: Arc<dyn DispatchAdapter>,
        directory: Arc<dyn ContactDirectory>,
        send_spacing: Duration,
    ) -> Self {
        Self {
            dispatch,
            directory,
            send_spacing,
        }
    }

    /// Attempt every contact in order. A failure for one contact is recorded
    /// and the rest are still tried; nothing here returns an error.
    pub async fn notify(
        &self,
        check_in: &CheckIn,
        trigger: EscalationTrigger,
        escalated_at: DateTime<Utc>,
    ) -> EscalationReport {
        let message = check_in.escalation_message();
        let mut report = EscalationReport {
            check_in_id: check_in.id.clone(),
            trigger,
            message: message.clone(),
            escalated_at,
            delivered: Vec::new(),
            failed: Vec::new(),
        };

        for (index, contact_id) in check_in.contacts.iter().enumerate() {
            if index > 0 && !self.send_spacing.is_zero() {
                tokio::time::sleep(self.send_spacing).await;
            }

            let outcome = match self.directory.resolve(contact_id).await {
                Ok(Some(contact)) => self
                    .dispatch
                    .send(&contact, &message)
                    .await
                    .map_err(|e| e.to_string()),
                Ok(None) => Err("unknown contact".to_string()),
                Err(e) => Err(format!("contact lookup failed: {e}")),
            };

            match outcome {
                Ok(message_id) => report.delivered.push(Delivery {
                    contact_id: contact_id.clone(),
                    message_id,
                }),
                Err(reason) => {
                    warn!(
                        check_in_id = %check_in.id,
                        contact_id = %contact_id,
                        error = %reason,
                        "escalation dispatch failed"
                    );
                    report.failed.push(DispatchFailure {
                        contact_id: contact_id.clone(),
                        reason,
                    });
                }
            }
        }

        info!(
            check_in_id = %check_in.id,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "escalation dispatched"
        );
        report
    }
}
