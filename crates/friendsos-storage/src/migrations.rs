// SPDX-FileCopyrightText: 2026 FriendSOS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! SQL files under `migrations/` are compiled in with `embed_migrations!`
//! and applied every time the database is opened.

use friendsos_core::FriendsosError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply pending migrations. Refinery records progress in
/// `refinery_schema_history`, so reruns are no-ops.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), FriendsosError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(FriendsosError::persistence)?;
    for migration in report.applied_migrations() {
        tracing::debug!(migration = %migration, "applied schema migration");
    }
    Ok(())
}
