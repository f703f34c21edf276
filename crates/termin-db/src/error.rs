//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Invariant check (repository)        │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module)  ◄─────────  DbError::Rejected(CoreError)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/api) ← Serialized as { code, message }                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Constraint violations raised by SQLite are normally translated back into
//! the `Rejected` error the application check would have produced (see the
//! repositories). The raw variants only surface when that is not possible.

use termin_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// A domain rule rejected the operation.
    ///
    /// ## When This Occurs
    /// - Addressed Termin/Person/Buchung does not exist
    /// - Booking references a missing Termin or Person
    /// - Duplicate booking, booking number or phone number
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Any UNIQUE index violation not translated by a repository
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - CHECK constraint violation
    /// - Runtime SQL error
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Returns the failure class of this error.
    ///
    /// ## Mapping
    /// ```text
    /// Rejected(e)            → e.kind()
    /// NotFound               → NotFound
    /// UniqueViolation        → Conflict
    /// ForeignKeyViolation    → BadRequest
    /// everything else        → Internal
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Rejected(err) => err.kind(),
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } => ErrorKind::Conflict,
            DbError::ForeignKeyViolation { .. } => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        }
    }

    /// True if this is a UNIQUE violation whose reported columns include
    /// `column` (`table.column` form).
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        match self {
            DbError::UniqueViolation { field, .. } => {
                field.split(", ").any(|c| c.trim() == column)
            }
            _ => false,
        }
    }

    /// True if this is a FOREIGN KEY violation.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, DbError::ForeignKeyViolation { .. })
    }
}

impl From<termin_core::ValidationError> for DbError {
    fn from(err: termin_core::ValidationError) -> Self {
        DbError::Rejected(CoreError::Validation(err))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>[, ...]"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================
