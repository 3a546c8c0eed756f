// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the FriendSOS check-in engine.
//!
//! This crate provides the check-in data model, the error type, and the
//! adapter traits the engine uses to reach storage, outbound dispatch, and
//! the local reminder surface.

pub mod checkin;
pub mod clock;
pub mod contact;
pub mod error;
pub mod traits;
pub mod types;

pub use checkin::{
    CheckIn, CheckInResponse, CheckInStatus, Location, NewCheckIn, ResponseStatus,
};
pub use clock::{Clock, SystemClock};
pub use contact::{Contact, ContactPriority};
pub use error::FriendsosError;
pub use types::{AdapterType, CheckInId, HealthStatus, MessageId, ReminderPrompt};

pub use traits::{
    CheckInStore, ContactDirectory, DispatchAdapter, PluginAdapter, ReminderSurface,
    StaticContactDirectory,
};
