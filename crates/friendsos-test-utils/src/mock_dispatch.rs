// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock dispatch adapter for deterministic testing.
//!
//! `MockDispatch` captures every message handed to `send()` and can be told
//! to reject specific contacts.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use friendsos_core::{
    AdapterType, Contact, DispatchAdapter, FriendsosError, HealthStatus, MessageId, PluginAdapter,
};

/// One captured send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub contact_id: String,
    pub address: Option<String>,
    pub text: String,
}

pub struct MockDispatch {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    notify: Arc<Notify>,
}

impl MockDispatch {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Make every future send to `contact_id` fail.
    pub async fn fail_for(&self, contact_id: &str) {
        self.failing.lock().await.insert(contact_id.to_string());
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Wait until at least `count` messages have been captured.
    pub async fn wait_for_sends(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.sent_count().await >= count {
                return;
            }
            notified.await;
        }
    }
}

impl Default for MockDispatch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockDispatch {
    fn name(&self) -> &str {
        "mock-dispatch"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Dispatch
    }

    async fn health_check(&self) -> Result<HealthStatus, FriendsosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        Ok(())
    }
}

#[async_trait]
impl DispatchAdapter for MockDispatch {
    async fn send(&self, contact: &Contact, message: &str) -> Result<MessageId, FriendsosError> {
        if self.failing.lock().await.contains(&contact.id) {
            return Err(FriendsosError::Dispatch {
                contact_id: contact.id.clone(),
                message: "gateway rejected message".into(),
                source: None,
            });
        }
        let mut sent = self.sent.lock().await;
        sent.push(SentMessage {
            contact_id: contact.id.clone(),
            address: contact.address().map(str::to_string),
            text: message.to_string(),
        });
        let id = MessageId(format!("mock-{}", sent.len()));
        drop(sent);
        self.notify.notify_waiters();
        Ok(id)
    }
}
