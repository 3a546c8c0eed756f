// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence for the FriendSOS check-in engine.
//!
//! A strict JSON codec for the check-in collection and a WAL-mode SQLite
//! key-value store behind the [`friendsos_core::CheckInStore`] trait. Schema
//! changes ship as embedded refinery migrations.

pub mod adapter;
pub mod codec;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use codec::{decode, encode, CodecError, CHECK_INS_KEY};
pub use database::Database;
