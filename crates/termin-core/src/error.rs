//! # Error Types
//!
//! Domain-specific error types for termin-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  termin-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rejections (not found, duplicates, ...)  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  termin-db errors (separate crate)                                     │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Every CoreError belongs to exactly one ErrorKind:                     │
//! │    NotFound │ BadRequest │ Conflict                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Messages
//! The display strings are the user-facing messages returned to clients,
//! so they are in German like the rest of the wire format.

use std::fmt;

use thiserror::Error;

use crate::types::{BuchungKey, PersonId, TerminId};

// =============================================================================
// Error Kind
// =============================================================================

/// Failure class of an operation, independent of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed entity does not exist.
    NotFound,
    /// The request references something invalid or breaks a creation rule.
    BadRequest,
    /// A uniqueness invariant would be violated.
    Conflict,
    /// Infrastructure failure (database unavailable, ...).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::BadRequest => "bad request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Domain rejections raised by the invariant checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Addressed appointment does not exist.
    #[error("Termin nicht gefunden")]
    TerminNotFound(TerminId),

    /// Addressed person does not exist.
    #[error("Person nicht gefunden")]
    PersonNotFound(PersonId),

    /// Addressed booking does not exist.
    #[error("Buchung nicht gefunden")]
    BuchungNotFound(BuchungKey),

    /// Booking creation references an appointment that does not exist.
    ///
    /// Distinct from [`CoreError::TerminNotFound`]: the appointment is not
    /// the addressed resource here, so this is a bad request.
    #[error("Termin existiert nicht")]
    UnknownTermin(TerminId),

    /// Booking creation references a person that does not exist.
    #[error("Person existiert nicht")]
    UnknownPerson(PersonId),

    /// Booking creation for a (termin, person) pair that is already booked.
    #[error("Buchung existiert bereits")]
    DuplicateBuchung(BuchungKey),

    /// Booking creation with a booking number that is already in use.
    #[error("Buchungsnummer bereits vergeben")]
    DuplicateBuchungsnummer(String),

    /// Another person already holds this phone number.
    #[error("Telefonnummer bereits vergeben")]
    TelefonnummerVergeben(String),

    /// Booking update to a number held by a different booking.
    #[error("Buchungsnummer bereits vergeben")]
    BuchungsnummerVergeben(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns the failure class of this error.
    ///
    /// ## Mapping
    /// ```text
    /// *NotFound                                   → NotFound
    /// Unknown*, Duplicate*, Validation            → BadRequest
    /// TelefonnummerVergeben, BuchungsnummerVergeben → Conflict
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::TerminNotFound(_)
            | CoreError::PersonNotFound(_)
            | CoreError::BuchungNotFound(_) => ErrorKind::NotFound,

            CoreError::UnknownTermin(_)
            | CoreError::UnknownPerson(_)
            | CoreError::DuplicateBuchung(_)
            | CoreError::DuplicateBuchungsnummer(_)
            | CoreError::Validation(_) => ErrorKind::BadRequest,

            CoreError::TelefonnummerVergeben(_) | CoreError::BuchungsnummerVergeben(_) => {
                ErrorKind::Conflict
            }
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any database access when a request body or query
/// parameter does not meet the field rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing, empty or explicitly null.
    #[error("{field} ist erforderlich")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} darf höchstens {max} Zeichen lang sein")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., unparsable timestamp, malformed email).
    #[error("{field} hat ein ungültiges Format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Creates an InvalidFormat error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let key = BuchungKey::new(1, 2);
        assert_eq!(
            CoreError::DuplicateBuchung(key).to_string(),
            "Buchung existiert bereits"
        );
        assert_eq!(
            CoreError::DuplicateBuchungsnummer("BK-1".into()).to_string(),
            "Buchungsnummer bereits vergeben"
        );
        assert_eq!(CoreError::UnknownTermin(7).to_string(), "Termin existiert nicht");
        assert_eq!(CoreError::TerminNotFound(7).to_string(), "Termin nicht gefunden");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(CoreError::PersonNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            CoreError::BuchungNotFound(BuchungKey::new(1, 1)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CoreError::UnknownPerson(1).kind(), ErrorKind::BadRequest);
        assert_eq!(
            CoreError::DuplicateBuchungsnummer("X".into()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            CoreError::TelefonnummerVergeben("123".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            CoreError::BuchungsnummerVergeben("X".into()).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.kind(), ErrorKind::BadRequest);
        assert_eq!(core_err.to_string(), "name ist erforderlich");
    }
}
