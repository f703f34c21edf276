//! # Terminverwaltung API
//!
//! HTTP server for appointments, people and bookings.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         API Routes                                      │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌────────────────────┐│
//! │  │  /termine          │  │  /personen         │  │  /buchungen        ││
//! │  │                    │  │                    │  │                    ││
//! │  │ • POST  create     │  │ • POST  create     │  │ • POST  create     ││
//! │  │ • GET   search     │  │ • GET   search     │  │ • GET   search     ││
//! │  │ /{id}              │  │ /{id}              │  │ /{t}/{p}           ││
//! │  │ • GET / PUT|PATCH  │  │ • GET / PUT|PATCH  │  │ • GET / PUT|PATCH  ││
//! │  │ • DELETE (cascade) │  │ • DELETE (cascade) │  │ • DELETE           ││
//! │  └────────────────────┘  └────────────────────┘  └────────────────────┘│
//! │                                                                         │
//! │  GET /health                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `TERMIN_HTTP_PORT` - HTTP port (default: 8000)
//! - `TERMIN_DATABASE_PATH` - SQLite file (default: ./data/termine.db)
//! - `TERMIN_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `TERMIN_CORS_ORIGINS` - Allowed browser origins
//! - `RUST_LOG` - Log filter

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use termin_db::Database;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use routes::router;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
