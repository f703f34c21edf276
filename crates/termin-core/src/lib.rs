//! # termin-core: Pure Domain Logic for the Terminverwaltung
//!
//! This crate holds the domain model of the booking backend: appointments
//! (`Termin`), people (`Person`) and the bookings (`Buchung`) that link them.
//! Everything here is pure: no database, no network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Terminverwaltung Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                               │   │
//! │  │    /termine  /personen  /buchungen                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ termin-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   patch   │  │  filter   │  │ validation│  │   │
//! │  │   │  Termin   │  │ Patch<T>  │  │ Termin-   │  │  limits   │  │   │
//! │  │   │  Person   │  │ unset/    │  │ Filter... │  │  email    │  │   │
//! │  │   │  Buchung  │  │ null/val  │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    termin-db (Database Layer)                   │   │
//! │  │        SQLite schema, constraints, guarded repositories         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and their create/update request types
//! - [`patch`] - Three-state field for partial updates
//! - [`timestamp`] - Lenient timestamp parsing and serde helpers
//! - [`validation`] - Field validation and normalisation
//! - [`filter`] - Search predicates for each collection
//! - [`error`] - Domain error taxonomy
//!
//! ## Example Usage
//!
//! ```rust
//! use termin_core::{Patch, Termin, TerminUpdate};
//!
//! let update: TerminUpdate = serde_json::from_str(r#"{"beschreibung": null}"#).unwrap();
//! assert!(update.beginn.is_unset());
//! assert_eq!(update.beschreibung, Patch::Null);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod patch;
pub mod timestamp;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use filter::{BuchungFilter, PersonFilter, TerminFilter};
pub use patch::Patch;
pub use validation::{PersonChanges, TerminChanges, ValidationResult};
pub use types::*;

// =============================================================================
// Column Limits
// =============================================================================
// Mirrors the column widths of the schema. The database enforces the same
// limits with CHECK constraints.

/// Maximum length of `Termin.beschreibung`.
pub const MAX_BESCHREIBUNG_LEN: usize = 255;

/// Maximum length of `Person.name`.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of `Person.telefonnummer`.
pub const MAX_TELEFONNUMMER_LEN: usize = 30;

/// Maximum length of `Person.email`.
pub const MAX_EMAIL_LEN: usize = 100;

/// Maximum length of `Buchung.buchungsnummer`.
pub const MAX_BUCHUNGSNUMMER_LEN: usize = 50;
