// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by every engine collaborator.

use async_trait::async_trait;

use crate::error::FriendsosError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for FriendSOS adapters.
///
/// Every collaborator the engine talks to (store, dispatch, reminder)
/// implements this trait, which provides identity, lifecycle, and health
/// check capabilities.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns which engine seam this adapter fills.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, FriendsosError>;

    /// Releases any held resources.
    async fn shutdown(&self) -> Result<(), FriendsosError>;
}
