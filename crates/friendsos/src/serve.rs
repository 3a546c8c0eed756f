// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `friendsos serve` command implementation.
//!
//! Opens the SQLite store, resumes every persisted check-in, and keeps the
//! engine running until SIGINT or SIGTERM. The query surface is logged on
//! a fixed poll interval.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use friendsos_checkin::{CheckInEngine, EngineSettings};
use friendsos_config::FriendsosConfig;
use friendsos_core::{CheckInStore, FriendsosError, StaticContactDirectory};
use friendsos_storage::SqliteStore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::{LogDispatch, TerminalReminder};
use crate::shutdown;

/// A running engine and the store it writes to.
pub struct EngineHandle {
    pub engine: CheckInEngine,
    pub store: Arc<SqliteStore>,
}

impl EngineHandle {
    /// Stop the engine, then flush the store.
    pub async fn close(self) -> Result<(), FriendsosError> {
        let stopped = self.engine.shutdown().await;
        self.store.close().await?;
        stopped
    }
}

/// Open the store and start an engine wired to the shipped adapters.
pub async fn open_engine(config: &FriendsosConfig) -> Result<EngineHandle, FriendsosError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let directory = StaticContactDirectory::new(config.contacts());
    if directory.is_empty() {
        warn!("no contacts configured; escalations will reach nobody");
    }

    let engine = CheckInEngine::builder()
        .store(store.clone())
        .dispatch(Arc::new(LogDispatch))
        .contacts(Arc::new(directory))
        .reminder(Arc::new(TerminalReminder::new(
            std::io::stdout().is_terminal(),
        )))
        .settings(EngineSettings::from(config))
        .build()?;
    engine.initialize().await?;

    Ok(EngineHandle { engine, store })
}

/// Runs the `friendsos serve` command.
pub async fn run_serve(config: FriendsosConfig) -> Result<(), FriendsosError> {
    crate::init_tracing(&config.app.log_level);
    info!(name = %config.app.name, "starting friendsos serve");

    let handle = open_engine(&config).await?;
    let cancel = shutdown::install_signal_handler();
    let poll = Duration::from_secs(config.checkin.poll_interval_secs);

    poll_until_cancelled(&handle.engine, poll, cancel).await;

    handle.close().await?;
    info!("friendsos serve shutdown complete");
    Ok(())
}

async fn poll_until_cancelled(engine: &CheckInEngine, poll: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(poll);
    loop {
        tokio::select! {
            _ = interval.tick() => log_status(engine).await,
            _ = cancel.cancelled() => {
                info!("stopping check-in engine");
                break;
            }
        }
    }
}

/// One status line per active check-in, then a summary.
async fn log_status(engine: &CheckInEngine) {
    let active = engine.active_check_ins().await;
    for check_in in &active {
        let next_check_secs = engine
            .time_until_next_check(&check_in.id)
            .await
            .map(|d| d.as_secs());
        info!(
            check_in_id = %check_in.id,
            next_check_secs,
            prompts = check_in.notifications_sent,
            max_prompts = check_in.max_notifications,
            "active check-in"
        );
    }
    let history = engine.check_in_history().await;
    info!(
        active = active.len(),
        finished = history.len(),
        "check-in status"
    );
}
