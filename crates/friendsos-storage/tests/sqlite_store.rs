// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests: the SQLite store survives a close and reopen.

use chrono::{DateTime, TimeDelta, Utc};
use friendsos_config::model::StorageConfig;
use friendsos_core::{CheckIn, CheckInId, CheckInStatus, CheckInStore, PluginAdapter};
use friendsos_storage::{Database, SqliteStore, CHECK_INS_KEY};
use tempfile::tempdir;

fn record(id: &str, status: CheckInStatus) -> CheckIn {
    let scheduled = DateTime::<Utc>::from_timestamp_millis(1_767_225_600_000).unwrap();
    CheckIn {
        id: CheckInId::from(id),
        user_id: "u-1".into(),
        scheduled_time: scheduled,
        end_time: None,
        interval_mins: 60,
        message: "Hiking the ridge trail".into(),
        contacts: vec!["alice".into()],
        response_required: true,
        escalation_delay_mins: 5,
        max_notifications: 3,
        notifications_sent: 2,
        custom_escalation_message: Some("Please call the ranger station".into()),
        last_response_time: Some(scheduled + TimeDelta::minutes(61)),
        last_prompt_time: Some(scheduled + TimeDelta::minutes(60)),
        status,
    }
}

fn config(path: &std::path::Path) -> StorageConfig {
    StorageConfig {
        database_path: path.to_string_lossy().into_owned(),
        wal_mode: true,
    }
}

#[tokio::test]
async fn saved_collection_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("friendsos.db");
    let records = vec![
        record("a", CheckInStatus::Active),
        record("b", CheckInStatus::Failed),
    ];

    let store = SqliteStore::new(config(&path));
    store.initialize().await.unwrap();
    store.save_check_ins(&records).await.unwrap();
    store.shutdown().await.unwrap();
    drop(store);

    let reopened = SqliteStore::new(config(&path));
    reopened.initialize().await.unwrap();
    let loaded = reopened.load_check_ins().await.unwrap();
    assert_eq!(loaded, records);
}

#[tokio::test]
async fn save_replaces_previous_collection() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::new(config(&dir.path().join("replace.db")));
    store.initialize().await.unwrap();

    store
        .save_check_ins(&[record("a", CheckInStatus::Active)])
        .await
        .unwrap();
    store
        .save_check_ins(&[record("a", CheckInStatus::Cancelled)])
        .await
        .unwrap();

    let loaded = store.load_check_ins().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].status, CheckInStatus::Cancelled);
}

#[tokio::test]
async fn corrupt_payload_surfaces_persistence_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.db");

    let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
    friendsos_storage::queries::kv::put(&db, CHECK_INS_KEY, "[{\"id\":1}]".into())
        .await
        .unwrap();
    db.close().await.unwrap();

    let store = SqliteStore::new(config(&path));
    store.initialize().await.unwrap();
    let err = store.load_check_ins().await.unwrap_err();
    assert!(matches!(err, friendsos_core::FriendsosError::Persistence { .. }));
}
