// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `friendsos status` command implementation.
//!
//! Reads the persisted collection directly from the store. No engine is
//! started, so no timers are armed and nothing is prompted or escalated.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use friendsos_config::FriendsosConfig;
use friendsos_core::{CheckIn, CheckInStatus, CheckInStore, FriendsosError};
use friendsos_storage::SqliteStore;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub database_path: String,
    pub active: Vec<StatusEntry>,
    pub history: Vec<StatusEntry>,
}

#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub id: String,
    pub status: CheckInStatus,
    pub message: String,
    pub interval_mins: u32,
    pub prompts_sent: u32,
    pub max_prompts: u32,
    pub next_check_at: Option<DateTime<Utc>>,
    pub last_response_at: Option<DateTime<Utc>>,
}

impl From<&CheckIn> for StatusEntry {
    fn from(c: &CheckIn) -> Self {
        Self {
            id: c.id.to_string(),
            status: c.status,
            message: c.message.clone(),
            interval_mins: c.interval_mins,
            prompts_sent: c.notifications_sent,
            max_prompts: c.max_notifications,
            next_check_at: c.is_active().then(|| c.next_check_at()),
            last_response_at: c.last_response_time,
        }
    }
}

/// Format seconds into a human-readable duration string.
pub fn format_remaining(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Split records into active (soonest next check first) and history (most
/// recent activity first), the same orderings the engine reports.
pub fn partition(records: Vec<CheckIn>) -> (Vec<CheckIn>, Vec<CheckIn>) {
    let (mut active, mut history): (Vec<CheckIn>, Vec<CheckIn>) =
        records.into_iter().partition(CheckIn::is_active);
    active.sort_by(|a, b| {
        a.next_check_at()
            .cmp(&b.next_check_at())
            .then_with(|| a.id.cmp(&b.id))
    });
    history.sort_by(|a, b| {
        b.last_activity_at()
            .cmp(&a.last_activity_at())
            .then_with(|| a.id.cmp(&b.id))
    });
    (active, history)
}

/// Run the `friendsos status` command.
pub async fn run_status(
    config: &FriendsosConfig,
    json: bool,
    plain: bool,
) -> Result<(), FriendsosError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;
    let records = store.load_check_ins().await?;
    store.close().await?;

    let (active, history) = partition(records);

    if json {
        let resp = StatusResponse {
            database_path: config.storage.database_path.clone(),
            active: active.iter().map(StatusEntry::from).collect(),
            history: history.iter().map(StatusEntry::from).collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&resp).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&active, &history, Utc::now(), use_color);
    }
    Ok(())
}

/// One human-readable line for a check-in.
pub fn describe(c: &CheckIn, now: DateTime<Utc>, use_color: bool) -> String {
    let short_id: String = c.id.as_str().chars().take(8).collect();
    let status = c.status.to_string();
    let status = if use_color {
        use colored::Colorize;
        match c.status {
            CheckInStatus::Active => status.green().to_string(),
            CheckInStatus::Completed => status.blue().to_string(),
            CheckInStatus::Failed => status.red().to_string(),
            CheckInStatus::Cancelled => status.dimmed().to_string(),
        }
    } else {
        status
    };
    let timing = if c.is_active() {
        let secs = (c.next_check_at() - now).num_seconds().max(0);
        format!("next in {}", format_remaining(secs.unsigned_abs()))
    } else {
        format!("last activity {}", c.last_activity_at().format("%Y-%m-%d %H:%M"))
    };
    format!(
        "{short_id}  {status:<9}  every {}m  {}/{} prompts  {timing}  {}",
        c.interval_mins, c.notifications_sent, c.max_notifications, c.message
    )
}

fn print_status(active: &[CheckIn], history: &[CheckIn], now: DateTime<Utc>, use_color: bool) {
    println!();
    println!("  friendsos status");
    println!("  {}", "-".repeat(35));
    println!("    Active:  {}", active.len());
    for c in active {
        println!("      {}", describe(c, now, use_color));
    }
    println!("    History: {}", history.len());
    for c in history {
        println!("      {}", describe(c, now, use_color));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use friendsos_core::CheckInId;

    fn t(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 7, 0, 0).unwrap() + TimeDelta::minutes(minutes)
    }

    fn record(id: &str, interval: u32, status: CheckInStatus) -> CheckIn {
        CheckIn {
            id: CheckInId::from(id),
            user_id: "u".into(),
            scheduled_time: t(0),
            end_time: None,
            interval_mins: interval,
            message: "Hike".into(),
            contacts: vec!["alice".into()],
            response_required: true,
            escalation_delay_mins: 5,
            max_notifications: 3,
            notifications_sent: 1,
            custom_escalation_message: None,
            last_response_time: None,
            last_prompt_time: None,
            status,
        }
    }

    #[test]
    fn format_remaining_minutes() {
        assert_eq!(format_remaining(120), "2m");
    }

    #[test]
    fn format_remaining_hours() {
        assert_eq!(format_remaining(3720), "1h 2m");
    }

    #[test]
    fn format_remaining_days() {
        assert_eq!(format_remaining(90060), "1d 1h 1m");
    }

    #[test]
    fn partition_orders_like_the_engine() {
        let mut late = record("late", 10, CheckInStatus::Cancelled);
        late.last_response_time = Some(t(50));
        let records = vec![
            record("slow", 90, CheckInStatus::Active),
            record("early", 10, CheckInStatus::Failed),
            record("fast", 15, CheckInStatus::Active),
            late,
        ];
        let (active, history) = partition(records);
        let ids = |v: &[CheckIn]| v.iter().map(|c| c.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&active), vec!["fast", "slow"]);
        assert_eq!(ids(&history), vec!["late", "early"]);
    }

    #[test]
    fn describe_active_shows_time_to_next_check() {
        let line = describe(&record("abcdefghijk", 30, CheckInStatus::Active), t(10), false);
        assert!(line.starts_with("abcdefgh  active"));
        assert!(line.contains("next in 20m"));
        assert!(line.contains("1/3 prompts"));
    }

    #[test]
    fn status_entry_omits_next_check_for_history() {
        let entry = StatusEntry::from(&record("x", 30, CheckInStatus::Completed));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"status\":\"completed\""));
        assert!(json.contains("\"next_check_at\":null"));
    }
}
