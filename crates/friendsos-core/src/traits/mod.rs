// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the engine's collaborators.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod contacts;
pub mod dispatch;
pub mod reminder;
pub mod store;

pub use adapter::PluginAdapter;
pub use contacts::{ContactDirectory, StaticContactDirectory};
pub use dispatch::DispatchAdapter;
pub use reminder::ReminderSurface;
pub use store::CheckInStore;
