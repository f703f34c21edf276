//! # termin-db: Database Layer for the Terminverwaltung
//!
//! This crate provides database access for appointments, people and
//! bookings. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Terminverwaltung Data Flow                         │
//! │                                                                         │
//! │  HTTP handler (POST /buchungen)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     termin-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ TerminRepo    │    │ 001_initial_ │  │   │
//! │  │   │ SqlitePool    │◄───│ PersonRepo    │    │ schema.sql   │  │   │
//! │  │   │ WAL, FKs on   │    │ BuchungRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./data/termine.db                                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (termin, person, buchung)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use termin_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/termine.db")).await?;
//!
//! let termin = db.termine().insert(new_termin).await?;
//! let buchungen = db.buchungen().search(&BuchungFilter::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{BuchungRepository, PersonRepository, TerminRepository};
