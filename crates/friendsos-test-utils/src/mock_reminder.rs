// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock reminder surface that records prompts and cues.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use friendsos_core::{
    AdapterType, FriendsosError, HealthStatus, PluginAdapter, ReminderPrompt, ReminderSurface,
};

pub struct MockReminder {
    prompts: Arc<Mutex<Vec<ReminderPrompt>>>,
    cues: AtomicUsize,
    broken: AtomicBool,
}

impl MockReminder {
    pub fn new() -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            cues: AtomicUsize::new(0),
            broken: AtomicBool::new(false),
        }
    }

    /// Make `show_prompt` and `play_cue` fail from now on.
    pub fn break_surface(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub async fn prompts(&self) -> Vec<ReminderPrompt> {
        self.prompts.lock().await.clone()
    }

    pub async fn prompt_count(&self) -> usize {
        self.prompts.lock().await.len()
    }

    pub fn cue_count(&self) -> usize {
        self.cues.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), FriendsosError> {
        if self.broken.load(Ordering::SeqCst) {
            Err(FriendsosError::Internal("reminder surface unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MockReminder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockReminder {
    fn name(&self) -> &str {
        "mock-reminder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Reminder
    }

    async fn health_check(&self) -> Result<HealthStatus, FriendsosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        Ok(())
    }
}

#[async_trait]
impl ReminderSurface for MockReminder {
    async fn show_prompt(&self, prompt: &ReminderPrompt) -> Result<(), FriendsosError> {
        self.check()?;
        self.prompts.lock().await.push(prompt.clone());
        Ok(())
    }

    async fn play_cue(&self) -> Result<(), FriendsosError> {
        self.check()?;
        self.cues.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
