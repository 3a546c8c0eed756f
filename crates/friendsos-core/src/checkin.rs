// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The check-in record, its status machine, and user responses.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FriendsosError;
use crate::types::CheckInId;

/// Lifecycle status of a check-in.
///
/// `Active` is the only non-terminal state. Once a record leaves it, no
/// timers are armed and its schedule fields never change again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckInStatus {
    Active,
    Completed,
    Cancelled,
    Failed,
}

impl CheckInStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// A recurring "are you safe?" monitoring obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: CheckInId,
    pub user_id: String,
    /// When the first check is due.
    pub scheduled_time: DateTime<Utc>,
    /// No check fires after this instant. `None` recurs until cancelled.
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes between successive checks. Always positive.
    pub interval_mins: u32,
    pub message: String,
    /// Contact identifiers notified on escalation, in order.
    pub contacts: Vec<String>,
    pub response_required: bool,
    /// Minutes after a prompt before it counts as unanswered.
    pub escalation_delay_mins: u32,
    pub max_notifications: u32,
    pub notifications_sent: u32,
    pub custom_escalation_message: Option<String>,
    pub last_response_time: Option<DateTime<Utc>>,
    /// When the most recent prompt was shown.
    pub last_prompt_time: Option<DateTime<Utc>>,
    pub status: CheckInStatus,
}

impl CheckIn {
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.interval_mins))
    }

    pub fn escalation_delay(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.escalation_delay_mins))
    }

    pub fn is_active(&self) -> bool {
        self.status == CheckInStatus::Active
    }

    /// The instant the next prompt is due: the later of the scheduled time
    /// and one interval after the most recent response.
    pub fn next_due_at(&self) -> DateTime<Utc> {
        match self.last_response_time {
            Some(responded) => self.scheduled_time.max(self.one_interval_after(responded)),
            None => self.scheduled_time,
        }
    }

    /// The next-check instant shown to the user and used for ordering the
    /// active list: `last_response_time ?? scheduled_time`, plus one interval.
    pub fn next_check_at(&self) -> DateTime<Utc> {
        self.one_interval_after(self.last_response_time.unwrap_or(self.scheduled_time))
    }

    /// `at` plus one interval, clamped to the latest representable instant.
    pub fn one_interval_after(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        saturating_add(at, self.interval())
    }

    /// The instant used to order history, most recent first.
    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_response_time.unwrap_or(self.scheduled_time)
    }

    /// A prompt has been shown and no response has arrived since.
    pub fn escalation_pending(&self) -> bool {
        match (self.last_prompt_time, self.last_response_time) {
            (Some(prompted), Some(responded)) => responded < prompted,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// When the outstanding prompt turns into an escalation, if one is pending.
    pub fn escalation_due_at(&self) -> Option<DateTime<Utc>> {
        if !self.escalation_pending() {
            return None;
        }
        self.last_prompt_time
            .map(|prompted| saturating_add(prompted, self.escalation_delay()))
    }

    /// True when `at` lies beyond the configured end of monitoring.
    pub fn is_past_end(&self, at: DateTime<Utc>) -> bool {
        self.end_time.is_some_and(|end| at > end)
    }

    pub fn notifications_exhausted(&self) -> bool {
        self.notifications_sent >= self.max_notifications
    }

    /// Text sent to contacts when this check-in escalates.
    pub fn escalation_message(&self) -> String {
        match &self.custom_escalation_message {
            Some(custom) => custom.clone(),
            None => format!(
                "{}\n\nUser has not responded to scheduled check-in.",
                self.message
            ),
        }
    }
}

fn saturating_add(at: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Parameters for creating a check-in.
///
/// `max_notifications` and `escalation_delay_mins` fall back to the
/// engine-wide defaults when left as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCheckIn {
    pub user_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub interval_mins: u32,
    pub message: String,
    pub contacts: Vec<String>,
    pub response_required: bool,
    pub escalation_delay_mins: Option<u32>,
    pub max_notifications: Option<u32>,
    pub custom_escalation_message: Option<String>,
    pub last_response_time: Option<DateTime<Utc>>,
}

impl NewCheckIn {
    pub fn new(
        user_id: impl Into<String>,
        message: impl Into<String>,
        scheduled_time: DateTime<Utc>,
        interval_mins: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            scheduled_time,
            end_time: None,
            interval_mins,
            message: message.into(),
            contacts: Vec::new(),
            response_required: true,
            escalation_delay_mins: None,
            max_notifications: None,
            custom_escalation_message: None,
            last_response_time: None,
        }
    }

    pub fn with_contacts<I, S>(mut self, contacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contacts = contacts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_escalation_delay(mut self, minutes: u32) -> Self {
        self.escalation_delay_mins = Some(minutes);
        self
    }

    pub fn with_max_notifications(mut self, max: u32) -> Self {
        self.max_notifications = Some(max);
        self
    }

    pub fn with_escalation_message(mut self, message: impl Into<String>) -> Self {
        self.custom_escalation_message = Some(message.into());
        self
    }

    /// Check the parameters without applying defaults.
    pub fn validate(&self) -> Result<(), FriendsosError> {
        if self.interval_mins == 0 {
            return Err(FriendsosError::validation(
                "interval",
                "must be a positive number of minutes",
            ));
        }
        if self.message.trim().is_empty() {
            return Err(FriendsosError::validation("message", "must not be empty"));
        }
        if self.contacts.iter().all(|c| c.trim().is_empty()) {
            return Err(FriendsosError::validation(
                "contacts",
                "at least one contact is required",
            ));
        }
        if self.max_notifications == Some(0) {
            return Err(FriendsosError::validation(
                "max_notifications",
                "must be at least 1",
            ));
        }
        if self.escalation_delay_mins == Some(0) {
            return Err(FriendsosError::validation(
                "escalation_delay",
                "must be a positive number of minutes",
            ));
        }
        let interval = TimeDelta::minutes(i64::from(self.interval_mins));
        if self.scheduled_time.checked_add_signed(interval).is_none() {
            return Err(FriendsosError::validation(
                "scheduled_time",
                "too far in the future to schedule",
            ));
        }
        if self
            .last_response_time
            .is_some_and(|responded| responded.checked_add_signed(interval).is_none())
        {
            return Err(FriendsosError::validation(
                "last_response_time",
                "too far in the future to schedule",
            ));
        }
        if self.end_time.is_some_and(|end| end <= self.scheduled_time) {
            return Err(FriendsosError::validation(
                "end_time",
                format!("must be after scheduled_time ({})", self.scheduled_time),
            ));
        }
        Ok(())
    }
}

/// How the user answered a check-in prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Safe,
    Help,
    Emergency,
}

impl ResponseStatus {
    /// Help and emergency responses escalate immediately.
    pub fn is_distress(self) -> bool {
        !matches!(self, Self::Safe)
    }
}

/// A coordinate attached to a response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// A user's answer to a check-in. The engine stamps the id and time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub status: ResponseStatus,
    pub location: Option<Location>,
    pub message: Option<String>,
}

impl CheckInResponse {
    pub fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            location: None,
            message: None,
        }
    }

    pub fn safe() -> Self {
        Self::new(ResponseStatus::Safe)
    }

    pub fn help() -> Self {
        Self::new(ResponseStatus::Help)
    }

    pub fn emergency() -> Self {
        Self::new(ResponseStatus::Emergency)
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(Location {
            latitude,
            longitude,
        });
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    fn record() -> CheckIn {
        CheckIn {
            id: CheckInId::from("c1"),
            user_id: "u1".into(),
            scheduled_time: t(0),
            end_time: None,
            interval_mins: 30,
            message: "walking home".into(),
            contacts: vec!["alice".into()],
            response_required: true,
            escalation_delay_mins: 5,
            max_notifications: 3,
            notifications_sent: 0,
            custom_escalation_message: None,
            last_response_time: None,
            last_prompt_time: None,
            status: CheckInStatus::Active,
        }
    }

    #[test]
    fn status_string_forms_are_lowercase() {
        assert_eq!(CheckInStatus::Cancelled.to_string(), "cancelled");
        assert_eq!(
            CheckInStatus::from_str("failed").unwrap(),
            CheckInStatus::Failed
        );
        assert!(CheckInStatus::from_str("paused").is_err());
    }

    #[test]
    fn only_active_is_non_terminal() {
        assert!(!CheckInStatus::Active.is_terminal());
        assert!(CheckInStatus::Completed.is_terminal());
        assert!(CheckInStatus::Cancelled.is_terminal());
        assert!(CheckInStatus::Failed.is_terminal());
    }

    #[test]
    fn next_due_is_scheduled_time_before_any_response() {
        assert_eq!(record().next_due_at(), t(0));
    }

    #[test]
    fn next_due_follows_response_plus_interval() {
        let mut c = record();
        c.last_response_time = Some(t(2));
        assert_eq!(c.next_due_at(), t(32));

        // A future scheduled time still wins.
        c.scheduled_time = t(60);
        assert_eq!(c.next_due_at(), t(60));
    }

    #[test]
    fn next_check_uses_presentation_formula() {
        let mut c = record();
        assert_eq!(c.next_check_at(), t(30));
        c.last_response_time = Some(t(40));
        assert_eq!(c.next_check_at(), t(70));
    }

    #[test]
    fn escalation_pending_tracks_prompt_and_response_order() {
        let mut c = record();
        assert!(!c.escalation_pending());

        c.last_prompt_time = Some(t(30));
        assert!(c.escalation_pending());
        assert_eq!(c.escalation_due_at(), Some(t(35)));

        c.last_response_time = Some(t(31));
        assert!(!c.escalation_pending());
        assert_eq!(c.escalation_due_at(), None);

        c.last_prompt_time = Some(t(61));
        assert!(c.escalation_pending());
    }

    #[test]
    fn default_escalation_message_appends_notice() {
        let c = record();
        assert_eq!(
            c.escalation_message(),
            "walking home\n\nUser has not responded to scheduled check-in."
        );
    }

    #[test]
    fn custom_escalation_message_wins() {
        let mut c = record();
        c.custom_escalation_message = Some("Call me now".into());
        assert_eq!(c.escalation_message(), "Call me now");
    }

    #[test]
    fn schedule_arithmetic_clamps_at_the_latest_instant() {
        let mut c = record();
        c.scheduled_time = DateTime::<Utc>::MAX_UTC;
        assert_eq!(c.next_check_at(), DateTime::<Utc>::MAX_UTC);
        assert_eq!(c.next_due_at(), DateTime::<Utc>::MAX_UTC);

        c.last_prompt_time = Some(DateTime::<Utc>::MAX_UTC);
        assert_eq!(c.escalation_due_at(), Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn validate_rejects_unschedulable_instants() {
        let far = NewCheckIn::new("u1", "hi", DateTime::<Utc>::MAX_UTC, 30).with_contacts(["alice"]);
        let err = far.validate().unwrap_err();
        assert!(
            matches!(err, FriendsosError::Validation { ref field, .. } if field == "scheduled_time")
        );

        let mut responded = NewCheckIn::new("u1", "hi", t(0), 30).with_contacts(["alice"]);
        responded.last_response_time = Some(DateTime::<Utc>::MAX_UTC);
        let err = responded.validate().unwrap_err();
        assert!(
            matches!(err, FriendsosError::Validation { ref field, .. } if field == "last_response_time")
        );
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let params = NewCheckIn::new("u1", "hi", t(0), 0).with_contacts(["alice"]);
        let err = params.validate().unwrap_err();
        assert!(matches!(err, FriendsosError::Validation { ref field, .. } if field == "interval"));
    }

    #[test]
    fn validate_rejects_missing_contacts_and_blank_message() {
        let no_contacts = NewCheckIn::new("u1", "hi", t(0), 30);
        assert!(no_contacts.validate().is_err());

        let blank = NewCheckIn::new("u1", "   ", t(0), 30).with_contacts(["alice"]);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let params = NewCheckIn::new("u1", "hi", t(10), 30)
            .with_contacts(["alice"])
            .with_end_time(t(5));
        assert!(params.validate().is_err());
    }

    #[test]
    fn validate_rejects_explicit_zero_overrides() {
        let base = NewCheckIn::new("u1", "hi", t(0), 30).with_contacts(["alice"]);
        assert!(base.clone().with_max_notifications(0).validate().is_err());
        assert!(base.clone().with_escalation_delay(0).validate().is_err());
        assert!(base.validate().is_ok());
    }

    #[test]
    fn distress_statuses() {
        assert!(!ResponseStatus::Safe.is_distress());
        assert!(ResponseStatus::Help.is_distress());
        assert!(ResponseStatus::Emergency.is_distress());
        assert_eq!(ResponseStatus::from_str("emergency").unwrap(), ResponseStatus::Emergency);
    }

    proptest::proptest! {
        #[test]
        fn next_due_never_precedes_scheduled_time(
            interval in 1u32..=1440,
            offset in -5000i64..5000,
        ) {
            let mut c = record();
            c.interval_mins = interval;
            c.last_response_time = Some(t(offset));
            proptest::prop_assert!(c.next_due_at() >= c.scheduled_time);
            proptest::prop_assert!(c.next_due_at() >= t(offset) + c.interval());
        }
    }
}
