// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery of escalation messages.

use async_trait::async_trait;

use crate::contact::Contact;
use crate::error::FriendsosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::MessageId;

/// Sends a text message to one contact (SMS gateway, email relay, ...).
#[async_trait]
pub trait DispatchAdapter: PluginAdapter {
    /// Deliver `message` to `contact`. Errors are reported per contact and
    /// never stop delivery to the remaining contacts.
    async fn send(&self, contact: &Contact, message: &str) -> Result<MessageId, FriendsosError>;
}
