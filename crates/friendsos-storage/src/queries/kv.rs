// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key-value operations on the `kv_store` table.

use friendsos_core::FriendsosError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Read the value stored under `key`.
pub async fn get(db: &Database, key: &str) -> Result<Option<String>, FriendsosError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the value under `key`, stamping `updated_at` in epoch millis.
pub async fn put(db: &Database, key: &str, value: String) -> Result<(), FriendsosError> {
    let key = key.to_string();
    let updated_at = chrono::Utc::now().timestamp_millis();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Remove `key`. Returns whether a row existed.
pub async fn delete(db: &Database, key: &str) -> Result<bool, FriendsosError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
