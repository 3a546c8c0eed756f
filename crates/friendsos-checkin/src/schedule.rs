// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure scheduling decisions for the prompt cycle.
//!
//! Every function here takes a record snapshot and an instant and returns
//! what the engine should do next. Nothing here touches timers or storage.

use std::time::Duration;

use chrono::{DateTime, Utc};
use friendsos_core::CheckIn;

/// What to do with a freshly created or resumed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arming {
    /// Arm the schedule timer for this instant.
    Schedule(DateTime<Utc>),
    /// Arm the escalation timer for this instant.
    Escalation(DateTime<Utc>),
    /// The next check would fall after `end_time`.
    Complete,
}

/// Outcome of a schedule timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptDecision {
    Prompt,
    /// `end_time` has passed.
    Complete,
    /// The notification cap is spent.
    Exhausted,
}

/// Outcome of a `safe` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSafe {
    Schedule(DateTime<Utc>),
    Complete,
    Exhausted,
}

/// Timer for a newly created record.
pub fn on_create(record: &CheckIn) -> Arming {
    let due = record.next_due_at();
    if record.is_past_end(due) {
        Arming::Complete
    } else {
        Arming::Schedule(due)
    }
}

/// Timer to re-arm for an active record loaded from storage.
///
/// A prompt that was shown but never answered resumes its escalation
/// countdown; anything else resumes the schedule. Records that do not
/// require a response never escalate and continue one interval after
/// their last prompt.
pub fn on_resume(record: &CheckIn) -> Arming {
    if record.response_required {
        return match record.escalation_due_at() {
            Some(due) => Arming::Escalation(due),
            None => on_create(record),
        };
    }
    let mut due = record.next_due_at();
    if let Some(prompted) = record.last_prompt_time {
        due = due.max(record.one_interval_after(prompted));
    }
    if record.is_past_end(due) {
        Arming::Complete
    } else {
        Arming::Schedule(due)
    }
}

pub fn on_schedule_due(record: &CheckIn, now: DateTime<Utc>) -> PromptDecision {
    if record.is_past_end(now) {
        PromptDecision::Complete
    } else if record.notifications_exhausted() {
        PromptDecision::Exhausted
    } else {
        PromptDecision::Prompt
    }
}

/// Decision after a `safe` response. `record.last_response_time` must
/// already hold the response instant.
pub fn on_safe_response(record: &CheckIn) -> AfterSafe {
    let Some(responded) = record.last_response_time else {
        return AfterSafe::Schedule(record.next_due_at());
    };
    if record.is_past_end(record.one_interval_after(responded)) {
        AfterSafe::Complete
    } else if record.notifications_exhausted() {
        AfterSafe::Exhausted
    } else {
        AfterSafe::Schedule(record.next_due_at())
    }
}

/// Sleep duration until `due`, zero when it is already past.
pub fn delay_until(due: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (due - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use friendsos_core::{CheckInId, CheckInStatus};

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    fn record() -> CheckIn {
        CheckIn {
            id: CheckInId::from("c"),
            user_id: "u".into(),
            scheduled_time: t(0),
            end_time: Some(t(100)),
            interval_mins: 30,
            message: "m".into(),
            contacts: vec!["a".into()],
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
    fn create_arms_scheduled_time() {
        assert_eq!(on_create(&record()), Arming::Schedule(t(0)));
    }

    #[test]
    fn create_completes_when_first_check_is_past_end() {
        let mut c = record();
        c.last_response_time = Some(t(80));
        assert_eq!(on_create(&c), Arming::Complete);
    }

    #[test]
    fn resume_prefers_outstanding_escalation() {
        let mut c = record();
        c.last_prompt_time = Some(t(30));
        c.notifications_sent = 1;
        assert_eq!(on_resume(&c), Arming::Escalation(t(35)));

        c.last_response_time = Some(t(32));
        assert_eq!(on_resume(&c), Arming::Schedule(t(62)));
    }

    #[test]
    fn resume_without_required_response_skips_escalation() {
        let mut c = record();
        c.response_required = false;
        c.last_prompt_time = Some(t(30));
        c.notifications_sent = 1;
        assert_eq!(on_resume(&c), Arming::Schedule(t(60)));

        c.last_prompt_time = Some(t(90));
        assert_eq!(on_resume(&c), Arming::Complete);
    }

    #[test]
    fn schedule_fire_checks_end_before_cap() {
        let mut c = record();
        assert_eq!(on_schedule_due(&c, t(30)), PromptDecision::Prompt);
        c.notifications_sent = 3;
        assert_eq!(on_schedule_due(&c, t(30)), PromptDecision::Exhausted);
        assert_eq!(on_schedule_due(&c, t(101)), PromptDecision::Complete);
    }

    #[test]
    fn safe_response_completes_when_next_check_passes_end() {
        let mut c = record();
        c.notifications_sent = 3;
        c.last_response_time = Some(t(75));
        assert_eq!(on_safe_response(&c), AfterSafe::Complete);
    }

    #[test]
    fn safe_response_exhausts_cap_before_end() {
        let mut c = record();
        c.notifications_sent = 3;
        c.last_response_time = Some(t(61));
        assert_eq!(on_safe_response(&c), AfterSafe::Exhausted);
    }

    #[test]
    fn safe_response_reschedules_one_interval_out() {
        let mut c = record();
        c.end_time = None;
        c.notifications_sent = 1;
        c.last_response_time = Some(t(3));
        assert_eq!(on_safe_response(&c), AfterSafe::Schedule(t(33)));
    }

    #[test]
    fn delay_is_clamped_at_zero() {
        assert_eq!(delay_until(t(0), t(5)), Duration::ZERO);
        assert_eq!(delay_until(t(5), t(0)), Duration::from_secs(300));
    }

    proptest::proptest! {
        #[test]
        fn nothing_is_scheduled_past_end(
            interval in 1u32..=240,
            responded in 0i64..200,
            sent in 0u32..3,
        ) {
            let mut c = record();
            c.interval_mins = interval;
            c.notifications_sent = sent;
            c.last_response_time = Some(t(responded));
            if let AfterSafe::Schedule(due) = on_safe_response(&c) {
                proptest::prop_assert!(due <= t(100));
                proptest::prop_assert!(due >= t(responded));
            }
        }
    }
}
