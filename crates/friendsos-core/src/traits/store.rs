// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage for check-in records.

use async_trait::async_trait;

use crate::checkin::CheckIn;
use crate::error::FriendsosError;
use crate::traits::adapter::PluginAdapter;

/// Persists the full set of check-in records.
///
/// The engine always writes the complete set, so implementations only need
/// whole-collection load and replace.
#[async_trait]
pub trait CheckInStore: PluginAdapter {
    /// Prepares the backend (open files, run migrations).
    async fn initialize(&self) -> Result<(), FriendsosError>;

    /// Loads every stored record. An empty or missing store yields an empty list.
    async fn load_check_ins(&self) -> Result<Vec<CheckIn>, FriendsosError>;

    /// Replaces the stored set with `check_ins`.
    async fn save_check_ins(&self, check_ins: &[CheckIn]) -> Result<(), FriendsosError>;

    /// Flushes and releases the backend.
    async fn close(&self) -> Result<(), FriendsosError>;
}
