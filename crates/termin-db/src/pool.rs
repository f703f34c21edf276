//! # Database Handle
//!
//! Opens the SQLite store of the Terminverwaltung and hands out repositories.
//!
//! ```text
//! Database::new(DbConfig)
//!   ├── open file (created if missing) or :memory:
//!   ├── PRAGMA journal_mode = WAL, synchronous = NORMAL
//!   ├── PRAGMA foreign_keys = ON        buchung → termin, person
//!   ├── busy_timeout                    racing writers wait for the lock
//!   └── apply embedded migrations
//!
//! db.termine() / db.personen() / db.buchungen()
//!   └── repository sharing the one pool
//! ```
//!
//! Every write the repositories issue is a single statement or a transaction
//! that starts with a write, so a writer either gets the lock within
//! `busy_timeout` or the request fails with a database error. It never
//! observes a half-applied change.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{BuchungRepository, PersonRepository, TerminRepository};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the store lives and how many connections may use it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,

    /// Pool size. Default: 5.
    pub max_connections: u32,

    /// How long a connection waits for the write lock. Default: 5 seconds.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Private in-memory store.
    ///
    /// Limited to one connection: each SQLite connection to `:memory:` opens
    /// its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            ..DbConfig::new(":memory:")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max.max(1);
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

/// Handle to the store. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store and brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening database"
        );

        let url = if config.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", config.database_path.display())
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(1)
            .acquire_timeout(config.busy_timeout * 2)
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Pool ready, applying migrations");
        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn termine(&self) -> TerminRepository {
        TerminRepository::new(self.pool.clone())
    }

    pub fn personen(&self) -> PersonRepository {
        PersonRepository::new(self.pool.clone())
    }

    pub fn buchungen(&self) -> BuchungRepository {
        BuchungRepository::new(self.pool.clone())
    }

    /// `(embedded, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// True if the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = db.migration_status().await.unwrap();
        assert!(total >= 1);
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();

        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_migration_status_reports_missing_history() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DROP TABLE _sqlx_migrations")
            .execute(db.pool())
            .await
            .unwrap();

        assert!(matches!(
            db.migration_status().await,
            Err(DbError::QueryFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_database_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config() {
        let config = DbConfig::new("/tmp/termine-test.db").max_connections(8);
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert!(!config.is_in_memory());

        let memory = DbConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert!(memory.is_in_memory());

        assert_eq!(DbConfig::new("x.db").max_connections(0).max_connections, 1);
    }
}
