//! # Validation Module
//!
//! Input validation and normalisation for the Terminverwaltung.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (apps/api)                                   │
//! │  └── Type validation (deserialization, timestamp parsing)              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, column limits, email format                      │
//! │  └── Update requests → *Changes (null on NOT NULL column rejected)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Repositories (termin-db)                                     │
//! │  └── Existence and uniqueness checks against the store                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Normalisation
//! Names, phone numbers, emails and booking numbers are trimmed. A phone
//! number or email that is empty after trimming counts as absent.

use chrono::{NaiveDate, NaiveDateTime};
use validator::ValidateEmail;

use crate::error::ValidationError;
use crate::types::{BuchungUpdate, Buchung, NewPerson, NewTermin, PersonUpdate, TerminUpdate};
use crate::{
    MAX_BESCHREIBUNG_LEN, MAX_BUCHUNGSNUMMER_LEN, MAX_EMAIL_LEN, MAX_NAME_LEN,
    MAX_TELEFONNUMMER_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

fn check_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Validates a person's name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 100 characters
///
/// ## Example
/// ```rust
/// use termin_core::validation::validate_name;
///
/// assert_eq!(validate_name("  Ana ").unwrap(), "Ana");
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }
    check_len("name", name, MAX_NAME_LEN)?;

    Ok(name.to_string())
}

/// Validates an appointment description.
///
/// ## Rules
/// - At most 255 characters
/// - Kept verbatim (free text)
pub fn validate_beschreibung(beschreibung: &str) -> ValidationResult<()> {
    check_len("beschreibung", beschreibung, MAX_BESCHREIBUNG_LEN)
}

/// Normalises a phone number.
///
/// ## Rules
/// - Trimmed; empty means "no phone number"
/// - At most 30 characters
///
/// ## Example
/// ```rust
/// use termin_core::validation::normalize_telefonnummer;
///
/// assert_eq!(normalize_telefonnummer(" 0301234 ").unwrap(), Some("0301234".to_string()));
/// assert_eq!(normalize_telefonnummer("").unwrap(), None);
/// ```
pub fn normalize_telefonnummer(telefonnummer: &str) -> ValidationResult<Option<String>> {
    let telefonnummer = telefonnummer.trim();

    if telefonnummer.is_empty() {
        return Ok(None);
    }
    check_len("telefonnummer", telefonnummer, MAX_TELEFONNUMMER_LEN)?;

    Ok(Some(telefonnummer.to_string()))
}

/// Normalises an email address.
///
/// ## Rules
/// - Trimmed; empty means "no email"
/// - At most 100 characters
/// - Must be a syntactically valid address
pub fn normalize_email(email: &str) -> ValidationResult<Option<String>> {
    let email = email.trim();

    if email.is_empty() {
        return Ok(None);
    }
    check_len("email", email, MAX_EMAIL_LEN)?;

    if !email.validate_email() {
        return Err(ValidationError::invalid_format(
            "email",
            "keine gültige E-Mail-Adresse",
        ));
    }

    Ok(Some(email.to_string()))
}

/// Validates a booking number.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most 50 characters
pub fn validate_buchungsnummer(buchungsnummer: &str) -> ValidationResult<String> {
    let buchungsnummer = buchungsnummer.trim();

    if buchungsnummer.is_empty() {
        return Err(ValidationError::required("buchungsnummer"));
    }
    check_len("buchungsnummer", buchungsnummer, MAX_BUCHUNGSNUMMER_LEN)?;

    Ok(buchungsnummer.to_string())
}

// =============================================================================
// Create Requests
// =============================================================================

impl NewTermin {
    /// Validates the request.
    pub fn validated(self) -> ValidationResult<NewTermin> {
        if let Some(beschreibung) = &self.beschreibung {
            validate_beschreibung(beschreibung)?;
        }
        Ok(self)
    }
}

impl NewPerson {
    /// Validates and normalises the request.
    pub fn validated(self) -> ValidationResult<NewPerson> {
        Ok(NewPerson {
            name: validate_name(&self.name)?,
            geburtstag: self.geburtstag,
            telefonnummer: self
                .telefonnummer
                .as_deref()
                .map(normalize_telefonnummer)
                .transpose()?
                .flatten(),
            email: self
                .email
                .as_deref()
                .map(normalize_email)
                .transpose()?
                .flatten(),
        })
    }
}

impl Buchung {
    /// Validates and normalises a booking create request.
    pub fn validated(self) -> ValidationResult<Buchung> {
        Ok(Buchung {
            buchungsnummer: validate_buchungsnummer(&self.buchungsnummer)?,
            ..self
        })
    }
}

// =============================================================================
// Update Requests
// =============================================================================
// Each update request is turned into a `*Changes` value:
//   NOT NULL column  → Option<T>          (None = untouched)
//   nullable column  → Option<Option<T>>  (None = untouched, Some(None) = clear)

/// Validated changes to a Termin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminChanges {
    pub beginn: Option<NaiveDateTime>,
    pub ende: Option<NaiveDateTime>,
    pub beschreibung: Option<Option<String>>,
}

impl TerminChanges {
    /// True when the update touches no field.
    pub fn is_empty(&self) -> bool {
        self.beginn.is_none() && self.ende.is_none() && self.beschreibung.is_none()
    }
}

impl TerminUpdate {
    /// Validates the update.
    ///
    /// ## Errors
    /// - `Required` if `beginn` or `ende` is explicitly null
    /// - `TooLong` for an oversized description
    pub fn into_changes(self) -> ValidationResult<TerminChanges> {
        let beschreibung = self.beschreibung.into_change();
        if let Some(Some(text)) = &beschreibung {
            validate_beschreibung(text)?;
        }

        Ok(TerminChanges {
            beginn: self.beginn.into_required("beginn")?,
            ende: self.ende.into_required("ende")?,
            beschreibung,
        })
    }
}

/// Validated changes to a Person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonChanges {
    pub name: Option<String>,
    pub geburtstag: Option<Option<NaiveDate>>,
    pub telefonnummer: Option<Option<String>>,
    pub email: Option<Option<String>>,
}

impl PersonChanges {
    /// True when the update touches no field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.geburtstag.is_none()
            && self.telefonnummer.is_none()
            && self.email.is_none()
    }

    /// The phone number this update assigns, if any.
    pub fn new_telefonnummer(&self) -> Option<&str> {
        match &self.telefonnummer {
            Some(Some(telefonnummer)) => Some(telefonnummer),
            _ => None,
        }
    }
}

impl PersonUpdate {
    /// Validates and normalises the update.
    ///
    /// ## Errors
    /// - `Required` if `name` is explicitly null or blank
    /// - `TooLong` / `InvalidFormat` per field rules
    pub fn into_changes(self) -> ValidationResult<PersonChanges> {
        let name = self
            .name
            .into_required("name")?
            .map(|name| validate_name(&name))
            .transpose()?;

        let telefonnummer = self
            .telefonnummer
            .try_map(|tel| normalize_telefonnummer(&tel))?
            .into_change()
            .map(Option::flatten);

        let email = self
            .email
            .try_map(|email| normalize_email(&email))?
            .into_change()
            .map(Option::flatten);

        Ok(PersonChanges {
            name,
            geburtstag: self.geburtstag.into_change(),
            telefonnummer,
            email,
        })
    }
}

impl BuchungUpdate {
    /// Validates the update and returns the new booking number, if any.
    ///
    /// ## Errors
    /// `Required` if `buchungsnummer` is null or blank.
    pub fn into_changes(self) -> ValidationResult<Option<String>> {
        self.buchungsnummer
            .into_required("buchungsnummer")?
            .map(|nr| validate_buchungsnummer(&nr))
            .transpose()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
