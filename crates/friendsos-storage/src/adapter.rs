// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CheckInStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use friendsos_config::model::StorageConfig;
use friendsos_core::{
    AdapterType, CheckIn, CheckInStore, FriendsosError, HealthStatus, PluginAdapter,
};

use crate::codec::{self, CHECK_INS_KEY};
use crate::database::{map_tr_err, Database};
use crate::queries::kv;

/// SQLite-backed check-in store.
///
/// The whole collection lives under one key of the `kv_store` table. The
/// database is opened lazily by [`CheckInStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// The connection is not opened until [`CheckInStore::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, FriendsosError> {
        self.db.get().ok_or_else(|| {
            FriendsosError::persistence("store not initialized -- call initialize() first")
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, FriendsosError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FriendsosError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl CheckInStore for SqliteStore {
    async fn initialize(&self) -> Result<(), FriendsosError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| FriendsosError::persistence("store already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn load_check_ins(&self) -> Result<Vec<CheckIn>, FriendsosError> {
        match kv::get(self.db()?, CHECK_INS_KEY).await? {
            Some(payload) => Ok(codec::decode(&payload)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_check_ins(&self, check_ins: &[CheckIn]) -> Result<(), FriendsosError> {
        let payload = codec::encode(check_ins)?;
        kv::put(self.db()?, CHECK_INS_KEY, payload).await?;
        debug!(count = check_ins.len(), "check-ins persisted");
        Ok(())
    }

    async fn close(&self) -> Result<(), FriendsosError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
