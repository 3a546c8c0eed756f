// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt-cycle scenarios driven on tokio's paused clock.

use std::time::Duration;

use friendsos_checkin::{ArmedTimers, EscalationTrigger};
use friendsos_core::{CheckInResponse, CheckInStatus, FriendsosError, ResponseStatus};
use friendsos_test_utils::TestHarness;

#[tokio::test(start_paused = true)]
async fn unanswered_check_in_escalates_once() {
    let h = TestHarness::new().await.unwrap();
    let params = h
        .check_in(30)
        .with_escalation_delay(5)
        .with_max_notifications(3);
    let created = h.engine.create_check_in(params).await.unwrap();
    assert_eq!(created.status, CheckInStatus::Active);

    h.advance_mins(3 * (30 + 5)).await;

    let record = h.engine.get_check_in(&created.id).await.unwrap();
    assert_eq!(record.status, CheckInStatus::Failed);
    assert_eq!(record.notifications_sent, 1);
    assert_eq!(h.reminder.prompt_count().await, 1);

    let report = h.engine.escalation_report(&created.id).await.unwrap();
    assert_eq!(report.trigger, EscalationTrigger::MissedCheckIn);
    assert_eq!(report.escalated_at, h.at(5));
    assert_eq!(report.delivered.len(), 2);
    // One escalation: one message per contact, no repeats.
    assert_eq!(h.dispatch.sent_count().await, 2);
    assert_eq!(h.engine.armed_timer_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn answered_cycles_complete_at_end_time() {
    let h = TestHarness::new().await.unwrap();
    let params = h.check_in(30).with_end_time(h.at(70));
    let c = h.engine.create_check_in(params).await.unwrap();

    for (cycle, prompt_at) in [(1, 0), (2, 31), (3, 62)] {
        h.advance_to(prompt_at).await;
        assert_eq!(h.reminder.prompt_count().await, cycle);
        h.advance_mins(1).await;
        let after = h
            .engine
            .respond_to_check_in(&c.id, CheckInResponse::safe())
            .await
            .unwrap();
        assert_eq!(after.notifications_sent, cycle as u32);
        if cycle < 3 {
            assert_eq!(after.status, CheckInStatus::Active);
        }
    }

    h.advance_to(120).await;
    let record = h.engine.get_check_in(&c.id).await.unwrap();
    assert_eq!(record.status, CheckInStatus::Completed);
    assert_eq!(h.dispatch.sent_count().await, 0);
    assert!(h.engine.escalation_report(&c.id).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn emergency_response_escalates_without_waiting() {
    let h = TestHarness::new().await.unwrap();
    let c = h.engine.create_check_in(h.check_in(30)).await.unwrap();
    h.advance_mins(1).await;
    assert_eq!(h.reminder.prompt_count().await, 1);

    let after = h
        .engine
        .respond_to_check_in(
            &c.id,
            CheckInResponse::emergency().with_location(51.5, -0.12),
        )
        .await
        .unwrap();

    // Escalate-and-stop: distress ends monitoring.
    assert_eq!(after.status, CheckInStatus::Failed);
    assert_eq!(h.dispatch.sent_count().await, 2);
    let report = h.engine.escalation_report(&c.id).await.unwrap();
    assert_eq!(
        report.trigger,
        EscalationTrigger::Distress(ResponseStatus::Emergency)
    );
    assert_eq!(report.escalated_at, h.at(1));
    assert_eq!(h.engine.armed_timers(&c.id).await, ArmedTimers::default());

    h.advance_mins(60).await;
    assert_eq!(h.dispatch.sent_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn help_response_before_first_prompt_also_escalates() {
    let h = TestHarness::new().await.unwrap();
    let params = h.check_in(30).with_escalation_message("Please call me");
    let c = h.engine.create_check_in(params).await.unwrap();

    h.engine
        .respond_to_check_in(&c.id, CheckInResponse::help())
        .await
        .unwrap();

    let sent = h.dispatch.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.text == "Please call me"));
}

#[tokio::test(start_paused = true)]
async fn cancel_between_prompt_and_escalation_suppresses_escalation() {
    let h = TestHarness::new().await.unwrap();
    let c = h.engine.create_check_in(h.check_in(30)).await.unwrap();
    h.advance_mins(1).await;
    assert_eq!(
        h.engine.armed_timers(&c.id).await,
        ArmedTimers {
            schedule: false,
            escalation: true
        }
    );

    let cancelled = h.engine.cancel_check_in(&c.id).await.unwrap();
    assert_eq!(cancelled.status, CheckInStatus::Cancelled);
    assert_eq!(h.engine.armed_timers(&c.id).await, ArmedTimers::default());

    h.advance_mins(60).await;
    assert_eq!(h.dispatch.sent_count().await, 0);
    let record = h.engine.get_check_in(&c.id).await.unwrap();
    assert_eq!(record.status, CheckInStatus::Cancelled);
    assert_eq!(h.engine.check_in_history().await.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn escalation_message_defaults_to_notice() {
    let h = TestHarness::new().await.unwrap();
    h.engine.create_check_in(h.check_in(30)).await.unwrap();
    h.advance_mins(6).await;

    let sent = h.dispatch.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].contact_id, "alice");
    assert_eq!(sent[1].contact_id, "bob");
    assert_eq!(
        sent[0].text,
        "Walking home from the station\n\nUser has not responded to scheduled check-in."
    );
}

#[tokio::test(start_paused = true)]
async fn safe_response_rearms_from_response_time() {
    let h = TestHarness::new().await.unwrap();
    let c = h.engine.create_check_in(h.check_in(30)).await.unwrap();
    h.advance_mins(2).await;
    h.engine
        .respond_to_check_in(&c.id, CheckInResponse::safe())
        .await
        .unwrap();
    assert_eq!(
        h.engine.armed_timers(&c.id).await,
        ArmedTimers {
            schedule: true,
            escalation: false
        }
    );

    // Next prompt at 2 + 30.
    h.advance_to(31).await;
    assert_eq!(h.reminder.prompt_count().await, 1);
    h.advance_to(33).await;
    assert_eq!(h.reminder.prompt_count().await, 2);
    let record = h.engine.get_check_in(&c.id).await.unwrap();
    assert_eq!(record.last_prompt_time, Some(h.at(32)));
}

#[tokio::test(start_paused = true)]
async fn notification_cap_fails_answered_check_in_without_alerting() {
    let h = TestHarness::new().await.unwrap();
    let c = h
        .engine
        .create_check_in(h.check_in(30).with_max_notifications(2))
        .await
        .unwrap();

    h.advance_mins(1).await;
    h.engine
        .respond_to_check_in(&c.id, CheckInResponse::safe())
        .await
        .unwrap();
    h.advance_to(32).await;
    let last = h
        .engine
        .respond_to_check_in(&c.id, CheckInResponse::safe())
        .await
        .unwrap();

    assert_eq!(last.notifications_sent, 2);
    assert_eq!(last.status, CheckInStatus::Failed);
    assert_eq!(h.dispatch.sent_count().await, 0);
    assert!(h.engine.escalation_report(&c.id).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn prompts_without_required_response_never_escalate() {
    let h = TestHarness::new().await.unwrap();
    let mut params = h.check_in(30).with_max_notifications(5);
    params.response_required = false;
    let c = h.engine.create_check_in(params).await.unwrap();

    h.advance_to(61).await;
    assert_eq!(h.reminder.prompt_count().await, 3);
    assert_eq!(h.dispatch.sent_count().await, 0);

    // The presentation formula has no response to anchor on, so the next
    // check reads as overdue.
    assert_eq!(
        h.engine.time_until_next_check(&c.id).await,
        Some(Duration::ZERO)
    );
}

#[tokio::test(start_paused = true)]
async fn reminder_failures_do_not_block_escalation() {
    let h = TestHarness::new().await.unwrap();
    h.reminder.break_surface();
    let c = h.engine.create_check_in(h.check_in(15)).await.unwrap();
    h.advance_mins(6).await;

    let record = h.engine.get_check_in(&c.id).await.unwrap();
    assert_eq!(record.status, CheckInStatus::Failed);
    assert_eq!(record.notifications_sent, 1);
    assert_eq!(h.dispatch.sent_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn future_scheduled_time_delays_first_prompt() {
    let h = TestHarness::new().await.unwrap();
    let mut params = h.check_in(30);
    params.scheduled_time = h.at(45);
    let c = h.engine.create_check_in(params).await.unwrap();

    assert_eq!(
        h.engine.time_until_next_check(&c.id).await,
        Some(Duration::from_secs(75 * 60))
    );
    h.advance_to(44).await;
    assert_eq!(h.reminder.prompt_count().await, 0);
    h.advance_to(46).await;
    assert_eq!(h.reminder.prompt_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn responding_to_terminal_or_unknown_check_in_is_not_found() {
    let h = TestHarness::new().await.unwrap();
    let c = h.engine.create_check_in(h.check_in(30)).await.unwrap();
    h.engine.cancel_check_in(&c.id).await.unwrap();

    let err = h
        .engine
        .respond_to_check_in(&c.id, CheckInResponse::safe())
        .await
        .unwrap_err();
    assert!(matches!(err, FriendsosError::NotFound { .. }));

    let err = h
        .engine
        .respond_to_check_in(&"missing".into(), CheckInResponse::emergency())
        .await
        .unwrap_err();
    assert!(matches!(err, FriendsosError::NotFound { .. }));
    assert_eq!(h.dispatch.sent_count().await, 0);
}
