//! # Schema Migrations
//!
//! The schema lives in `migrations/sqlite/` and is compiled into the crate.
//! [`Database::new`](crate::Database::new) applies whatever is pending, so a
//! fresh file and an older file end up with the same tables.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_initial_schema.sql   termin, person, buchung + constraints
//! ```
//!
//! New changes go into a new `NNN_*.sql` file. Applied files are checksummed
//! by sqlx and must not be edited. Column widths in the SQL CHECKs follow the
//! `MAX_*` constants of `termin_core`.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies pending migrations in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(migrations = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
///
/// Fails if the migration history cannot be read.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
