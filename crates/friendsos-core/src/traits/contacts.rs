// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup of contact identifiers referenced by check-ins.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::contact::Contact;
use crate::error::FriendsosError;

/// Resolves contact identifiers to full contact records.
#[async_trait]
pub trait ContactDirectory: Send + Sync + 'static {
    /// Returns `Ok(None)` for identifiers the directory does not know.
    async fn resolve(&self, contact_id: &str) -> Result<Option<Contact>, FriendsosError>;
}

/// A fixed, in-memory directory, typically built from the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticContactDirectory {
    contacts: HashMap<String, Contact>,
}

impl StaticContactDirectory {
    pub fn new(contacts: impl IntoIterator<Item = Contact>) -> Self {
        Self {
            contacts: contacts.into_iter().map(|c| (c.id.clone(), c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn contains(&self, contact_id: &str) -> bool {
        self.contacts.contains_key(contact_id)
    }
}

#[async_trait]
impl ContactDirectory for StaticContactDirectory {
    async fn resolve(&self, contact_id: &str) -> Result<Option<Contact>, FriendsosError> {
        Ok(self.contacts.get(contact_id).cloned())
    }
}
