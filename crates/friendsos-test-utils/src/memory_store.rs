// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory check-in store with failure injection.
//!
//! Unlike the SQLite store it never leaves the runtime thread, so it is safe
//! under `tokio::test(start_paused = true)`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use friendsos_core::{
    AdapterType, CheckIn, CheckInStore, FriendsosError, HealthStatus, PluginAdapter,
};

pub struct MemoryStore {
    records: Arc<Mutex<Vec<CheckIn>>>,
    failing_saves: AtomicU32,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// A store that already holds `records`, as after a previous run.
    pub fn with_records(records: Vec<CheckIn>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            failing_saves: AtomicU32::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    /// Make the next `count` saves fail.
    pub fn fail_next_saves(&self, count: u32) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    /// The last successfully saved collection.
    pub async fn saved(&self) -> Vec<CheckIn> {
        self.records.lock().await.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, FriendsosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        Ok(())
    }
}

#[async_trait]
impl CheckInStore for MemoryStore {
    async fn initialize(&self) -> Result<(), FriendsosError> {
        Ok(())
    }

    async fn load_check_ins(&self) -> Result<Vec<CheckIn>, FriendsosError> {
        Ok(self.records.lock().await.clone())
    }

    async fn save_check_ins(&self, check_ins: &[CheckIn]) -> Result<(), FriendsosError> {
        let injected = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(FriendsosError::persistence("injected save failure"));
        }
        *self.records.lock().await = check_ins.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), FriendsosError> {
        Ok(())
    }
}
