//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` at the workspace root are
//! compiled into the binary and applied when a [`Database`](crate::Database)
//! opens.
//!
//! New schema changes go in a new `NNN_description.sql` file; applied files
//! are checksummed by sqlx and must not be edited afterwards.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Known vs applied migration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub known: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.known
    }
}

/// Applies every migration not yet recorded in `_sqlx_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = migration_status(pool).await?;
    debug!(known = before.known, applied = before.applied, "Migration status before run");

    MIGRATOR.run(pool).await?;

    let after = migration_status(pool).await?;
    info!(
        newly_applied = after.applied.saturating_sub(before.applied),
        total = after.applied,
        "Schema up to date"
    );
    Ok(())
}

/// Reads the migration bookkeeping table. A fresh database reports zero
/// applied migrations.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    let applied: i64 = if table_exists == 0 {
        0
    } else {
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?
    };

    Ok(MigrationStatus {
        known: MIGRATOR.migrations.len(),
        applied: applied as usize,
    })
}
