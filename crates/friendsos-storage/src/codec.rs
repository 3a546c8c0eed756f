// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted wire shape of the check-in collection.
//!
//! The collection is stored as a JSON array of camelCase objects with every
//! instant encoded as epoch milliseconds. Decoding is strict: an unknown
//! status, an out-of-range timestamp, or a zero interval rejects the payload.

use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use friendsos_core::{CheckIn, CheckInId, CheckInStatus, FriendsosError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Key under which the collection is stored.
pub const CHECK_INS_KEY: &str = "friendsos_checkins";

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed check-in payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("check-in {id}: unknown status `{status}`")]
    UnknownStatus { id: String, status: String },

    #[error("check-in {id}: {field} timestamp {millis} is out of range")]
    Timestamp {
        id: String,
        field: &'static str,
        millis: i64,
    },

    #[error("check-in {id}: interval must be positive")]
    ZeroInterval { id: String },
}

impl From<CodecError> for FriendsosError {
    fn from(err: CodecError) -> Self {
        FriendsosError::persistence(err)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCheckIn {
    id: String,
    user_id: String,
    scheduled_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<i64>,
    interval: u32,
    message: String,
    contacts: Vec<String>,
    response_required: bool,
    escalation_delay: u32,
    max_notifications: u32,
    notifications_sent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_escalation_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_response_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_prompt_time: Option<i64>,
    status: String,
}

impl From<&CheckIn> for StoredCheckIn {
    fn from(c: &CheckIn) -> Self {
        Self {
            id: c.id.to_string(),
            user_id: c.user_id.clone(),
            scheduled_time: c.scheduled_time.timestamp_millis(),
            end_time: c.end_time.map(|t| t.timestamp_millis()),
            interval: c.interval_mins,
            message: c.message.clone(),
            contacts: c.contacts.clone(),
            response_required: c.response_required,
            escalation_delay: c.escalation_delay_mins,
            max_notifications: c.max_notifications,
            notifications_sent: c.notifications_sent,
            custom_escalation_message: c.custom_escalation_message.clone(),
            last_response_time: c.last_response_time.map(|t| t.timestamp_millis()),
            last_prompt_time: c.last_prompt_time.map(|t| t.timestamp_millis()),
            status: c.status.to_string(),
        }
    }
}

impl TryFrom<StoredCheckIn> for CheckIn {
    type Error = CodecError;

    fn try_from(s: StoredCheckIn) -> Result<Self, Self::Error> {
        let instant = |field: &'static str, millis: i64| {
            DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| CodecError::Timestamp {
                id: s.id.clone(),
                field,
                millis,
            })
        };
        let optional = |field: &'static str, millis: Option<i64>| {
            millis.map(|m| instant(field, m)).transpose()
        };

        let status = CheckInStatus::from_str(&s.status).map_err(|_| CodecError::UnknownStatus {
            id: s.id.clone(),
            status: s.status.clone(),
        })?;
        if s.interval == 0 {
            return Err(CodecError::ZeroInterval { id: s.id.clone() });
        }

        let scheduled_time = instant("scheduledTime", s.scheduled_time)?;
        let end_time = optional("endTime", s.end_time)?;
        let last_response_time = optional("lastResponseTime", s.last_response_time)?;
        let last_prompt_time = optional("lastPromptTime", s.last_prompt_time)?;

        // Every instant the engine derives from this record must be representable.
        let interval = TimeDelta::minutes(i64::from(s.interval));
        let escalation_delay = TimeDelta::minutes(i64::from(s.escalation_delay));
        let schedulable = |field: &'static str, at: DateTime<Utc>, delta: TimeDelta| {
            match at.checked_add_signed(delta) {
                Some(_) => Ok(()),
                None => Err(CodecError::Timestamp {
                    id: s.id.clone(),
                    field,
                    millis: at.timestamp_millis(),
                }),
            }
        };
        schedulable("scheduledTime", scheduled_time, interval)?;
        if let Some(at) = last_response_time {
            schedulable("lastResponseTime", at, interval)?;
        }
        if let Some(at) = last_prompt_time {
            schedulable("lastPromptTime", at, interval.max(escalation_delay))?;
        }

        Ok(CheckIn {
            id: CheckInId(s.id),
            user_id: s.user_id,
            scheduled_time,
            end_time,
            interval_mins: s.interval,
            message: s.message,
            contacts: s.contacts,
            response_required: s.response_required,
            escalation_delay_mins: s.escalation_delay,
            max_notifications: s.max_notifications,
            notifications_sent: s.notifications_sent,
            custom_escalation_message: s.custom_escalation_message,
            last_response_time,
            last_prompt_time,
            status,
        })
    }
}

/// Serialize the collection to its persisted JSON form.
pub fn encode(check_ins: &[CheckIn]) -> Result<String, CodecError> {
    let stored: Vec<StoredCheckIn> = check_ins.iter().map(StoredCheckIn::from).collect();
    Ok(serde_json::to_string(&stored)?)
}

/// Parse a persisted payload. A blank payload decodes to an empty collection.
pub fn decode(payload: &str) -> Result<Vec<CheckIn>, CodecError> {
    if payload.trim().is_empty() {
        return Ok(Vec::new());
    }
    let stored: Vec<StoredCheckIn> = serde_json::from_str(payload)?;
    stored.into_iter().map(CheckIn::try_from).collect()
}
