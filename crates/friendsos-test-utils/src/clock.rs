// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall clock driven by tokio's (pausable) time.

use chrono::{DateTime, TimeDelta, Utc};
use friendsos_core::Clock;
use tokio::time::Instant;

/// Reports `origin` plus the tokio time elapsed since construction.
///
/// Under `#[tokio::test(start_paused = true)]` this advances exactly as far
/// as the runtime's virtual clock, so timers and `now()` stay consistent.
#[derive(Debug, Clone)]
pub struct TestClock {
    origin: DateTime<Utc>,
    started: Instant,
}

impl TestClock {
    pub fn starting_at(origin: DateTime<Utc>) -> Self {
        Self {
            origin,
            started: Instant::now(),
        }
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or(TimeDelta::zero());
        self.origin + elapsed
    }
}
