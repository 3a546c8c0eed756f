// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for FriendSOS.
//!
//! Mock adapters and a harness for fast, deterministic tests that never
//! touch a real SMS gateway, terminal, or wall clock.
//!
//! - [`MockDispatch`] captures escalation messages and injects per-contact failures
//! - [`MockReminder`] records prompts and cues
//! - [`MemoryStore`] keeps the collection in memory and can fail saves on demand
//! - [`TestClock`] follows tokio's paused clock
//! - [`TestHarness`] wires all of the above to a [`friendsos_checkin::CheckInEngine`]

pub mod clock;
pub mod harness;
pub mod memory_store;
pub mod mock_dispatch;
pub mod mock_reminder;

pub use clock::TestClock;
pub use harness::{contact, epoch, settle, TestHarness, TestHarnessBuilder};
pub use memory_store::MemoryStore;
pub use mock_dispatch::{MockDispatch, SentMessage};
pub use mock_reminder::MockReminder;
