// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a [`CheckInEngine`] to mock collaborators.
//!
//! Meant for `#[tokio::test(start_paused = true)]`: `advance()` moves the
//! virtual clock and lets every timer that came due run to completion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use friendsos_checkin::{CheckInEngine, EngineSettings};
use friendsos_core::{
    CheckIn, CheckInStore, Contact, ContactPriority, FriendsosError, NewCheckIn,
    StaticContactDirectory,
};

use crate::clock::TestClock;
use crate::memory_store::MemoryStore;
use crate::mock_dispatch::MockDispatch;
use crate::mock_reminder::MockReminder;

/// Fixed start instant for harness clocks.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 20, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A contact reachable by phone.
pub fn contact(id: &str) -> Contact {
    Contact {
        id: id.to_string(),
        name: id.to_string(),
        phone: Some(format!("+1555{:04}", id.len())),
        email: None,
        priority: ContactPriority::Medium,
    }
}

pub struct TestHarnessBuilder {
    contacts: Vec<Contact>,
    records: Vec<CheckIn>,
    settings: EngineSettings,
    origin: DateTime<Utc>,
    store: Option<Arc<dyn CheckInStore>>,
    initialize: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            contacts: vec![contact("alice"), contact("bob")],
            records: Vec::new(),
            settings: EngineSettings {
                send_spacing: Duration::ZERO,
                ..EngineSettings::default()
            },
            origin: epoch(),
            store: None,
            initialize: true,
        }
    }

    /// Replace the default directory (alice, bob).
    pub fn with_contacts(mut self, contacts: Vec<Contact>) -> Self {
        self.contacts = contacts;
        self
    }

    /// Records present in the memory store before the engine starts.
    pub fn with_persisted(mut self, records: Vec<CheckIn>) -> Self {
        self.records = records;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn starting_at(mut self, origin: DateTime<Utc>) -> Self {
        self.origin = origin;
        self
    }

    /// Use a different store instead of the memory store.
    pub fn with_store(mut self, store: Arc<dyn CheckInStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Leave the engine uninitialized.
    pub fn uninitialized(mut self) -> Self {
        self.initialize = false;
        self
    }

    pub async fn build(self) -> Result<TestHarness, FriendsosError> {
        let memory = Arc::new(MemoryStore::with_records(self.records));
        let store: Arc<dyn CheckInStore> = match self.store {
            Some(store) => store,
            None => memory.clone(),
        };
        let dispatch = Arc::new(MockDispatch::new());
        let reminder = Arc::new(MockReminder::new());
        let clock = Arc::new(TestClock::starting_at(self.origin));

        let engine = CheckInEngine::builder()
            .store(store)
            .dispatch(dispatch.clone())
            .contacts(Arc::new(StaticContactDirectory::new(self.contacts)))
            .reminder(reminder.clone())
            .clock(clock.clone())
            .settings(self.settings)
            .build()?;
        if self.initialize {
            engine.initialize().await?;
        }

        Ok(TestHarness {
            engine,
            store: memory,
            dispatch,
            reminder,
            clock,
        })
    }
}

/// An engine plus handles to every mock it talks to.
pub struct TestHarness {
    pub engine: CheckInEngine,
    pub store: Arc<MemoryStore>,
    pub dispatch: Arc<MockDispatch>,
    pub reminder: Arc<MockReminder>,
    pub clock: Arc<TestClock>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn new() -> Result<Self, FriendsosError> {
        Self::builder().build().await
    }

    /// Current virtual wall-clock time.
    pub fn now(&self) -> DateTime<Utc> {
        friendsos_core::Clock::now(self.clock.as_ref())
    }

    /// `origin + minutes`.
    pub fn at(&self, minutes: i64) -> DateTime<Utc> {
        self.clock.origin() + TimeDelta::minutes(minutes)
    }

    /// Creation parameters due now, sent to alice and bob.
    pub fn check_in(&self, interval_mins: u32) -> NewCheckIn {
        NewCheckIn::new("user-1", "Walking home from the station", self.now(), interval_mins)
            .with_contacts(["alice", "bob"])
    }

    /// Advance virtual time and let due timers finish their work.
    pub async fn advance(&self, by: Duration) {
        tokio::time::sleep(by).await;
        settle().await;
    }

    pub async fn advance_mins(&self, minutes: u64) {
        self.advance(Duration::from_secs(minutes * 60)).await;
    }

    /// Advance to `origin + minutes` (no-op if already past).
    pub async fn advance_to(&self, minutes: i64) {
        let target = self.at(minutes);
        let remaining = (target - self.now()).to_std().unwrap_or(Duration::ZERO);
        self.advance(remaining).await;
    }
}

/// Yield repeatedly so spawned timer tasks can run to completion.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
