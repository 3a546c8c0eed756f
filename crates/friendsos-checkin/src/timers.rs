// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-record timer table.
//!
//! Each record has at most one schedule timer and one escalation timer. A
//! timer is a tokio task sleeping until its due instant; the table owns its
//! `JoinHandle` and a token unique to that arming. When a timer wakes it must
//! present its token through [`TimerTable::claim`]; a disarmed or re-armed
//! timer fails the claim and does nothing.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use friendsos_core::CheckInId;
use tokio::task::JoinHandle;

pub(crate) type TimerFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Which of a record's two timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Schedule,
    Escalation,
}

/// Identifies one arming of one timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

struct Armed {
    token: TimerToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub(crate) struct TimerTable {
    next_token: u64,
    armed: HashMap<(CheckInId, TimerKind), Armed>,
}

impl TimerTable {
    /// Arm `kind` for `id`, replacing (and aborting) any previous arming.
    ///
    /// `fire` receives the new token once `delay` has elapsed.
    pub(crate) fn arm<F>(&mut self, id: &CheckInId, kind: TimerKind, delay: Duration, fire: F)
    where
        F: FnOnce(TimerToken) -> TimerFuture + Send + 'static,
    {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire(token).await;
        });
        if let Some(previous) = self.armed.insert((id.clone(), kind), Armed { token, handle }) {
            previous.handle.abort();
        }
    }

    /// Consume the arming identified by `token` if it is still current.
    ///
    /// The entry is dropped without aborting, since the caller is the
    /// timer task itself.
    pub(crate) fn claim(&mut self, id: &CheckInId, kind: TimerKind, token: TimerToken) -> bool {
        let key = (id.clone(), kind);
        match self.armed.get(&key) {
            Some(armed) if armed.token == token => {
                self.armed.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn disarm(&mut self, id: &CheckInId, kind: TimerKind) {
        if let Some(armed) = self.armed.remove(&(id.clone(), kind)) {
            armed.handle.abort();
        }
    }

    /// Disarm both timers of a record, as on any terminal transition.
    pub(crate) fn disarm_all(&mut self, id: &CheckInId) {
        self.disarm(id, TimerKind::Schedule);
        self.disarm(id, TimerKind::Escalation);
    }

    pub(crate) fn is_armed(&self, id: &CheckInId, kind: TimerKind) -> bool {
        self.armed.contains_key(&(id.clone(), kind))
    }

    pub(crate) fn len(&self) -> usize {
        self.armed.len()
    }

    /// Abort every timer.
    pub(crate) fn clear(&mut self) {
        for (_, armed) in self.armed.drain() {
            armed.handle.abort();
        }
    }
}

impl Drop for TimerTable {
    fn drop(&mut self) {
        self.clear();
    }
}
