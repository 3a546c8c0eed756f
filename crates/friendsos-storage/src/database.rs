// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMA setup, WAL mode, migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, which
//! serializes writes. Do not open a second connection for writing.

use std::path::Path;

use friendsos_core::FriendsosError;
use tracing::debug;

use crate::migrations;

/// Owned handle to the SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, FriendsosError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(FriendsosError::persistence)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(FriendsosError::persistence)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and `status` dry runs.
    pub async fn open_in_memory() -> Result<Self, FriendsosError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(FriendsosError::persistence)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), FriendsosError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    debug!(journal_mode = %mode, "journal mode set");
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| -> Result<(), FriendsosError> { migrations::run_migrations(conn) })
            .await
            .map_err(FriendsosError::persistence)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), FriendsosError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Close the connection, flushing the WAL first.
    pub async fn close(self) -> Result<(), FriendsosError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(FriendsosError::persistence)
    }
}

/// Map a tokio-rusqlite error onto the engine's persistence error.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> FriendsosError {
    FriendsosError::persistence(e)
}
