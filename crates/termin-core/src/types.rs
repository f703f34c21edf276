//! # Domain Types
//!
//! Core domain types used throughout the Terminverwaltung.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Termin      │   │     Buchung     │   │     Person      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  termin_id (PK) │◄──│  termin_id  ┐PK │──►│  person_id (PK) │       │
//! │  │  beginn         │   │  person_id  ┘   │   │  name           │       │
//! │  │  ende           │   │  buchungsnummer │   │  geburtstag     │       │
//! │  │  beschreibung   │   │  (unique)       │   │  telefonnummer  │       │
//! │  └─────────────────┘   └─────────────────┘   │  (unique)       │       │
//! │                                              │  email          │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Request Types
//! Each entity has a create type (`New*`, all required fields present) and
//! an update type (`*Update`, every field a [`Patch`]).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::patch::Patch;

/// Surrogate key of a [`Termin`].
pub type TerminId = i64;

/// Surrogate key of a [`Person`].
pub type PersonId = i64;

// =============================================================================
// Termin
// =============================================================================

/// An appointment: a time interval with an optional description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Termin {
    pub termin_id: TerminId,

    /// Start of the appointment.
    #[serde(with = "crate::timestamp")]
    #[ts(as = "String")]
    pub beginn: NaiveDateTime,

    /// End of the appointment. Not checked against `beginn`.
    #[serde(with = "crate::timestamp")]
    #[ts(as = "String")]
    pub ende: NaiveDateTime,

    pub beschreibung: Option<String>,
}

/// Request body for creating a [`Termin`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTermin {
    #[serde(with = "crate::timestamp")]
    #[ts(as = "String")]
    pub beginn: NaiveDateTime,

    #[serde(with = "crate::timestamp")]
    #[ts(as = "String")]
    pub ende: NaiveDateTime,

    #[serde(default)]
    #[ts(optional)]
    pub beschreibung: Option<String>,
}

/// Partial update of a [`Termin`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TerminUpdate {
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_patch")]
    pub beginn: Patch<NaiveDateTime>,

    #[serde(default, deserialize_with = "crate::timestamp::deserialize_patch")]
    pub ende: Patch<NaiveDateTime>,

    #[serde(default)]
    pub beschreibung: Patch<String>,
}

// =============================================================================
// Person
// =============================================================================

/// A person with contact attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Person {
    pub person_id: PersonId,

    pub name: String,

    #[ts(as = "Option<String>")]
    pub geburtstag: Option<NaiveDate>,

    /// Globally unique when present.
    pub telefonnummer: Option<String>,

    pub email: Option<String>,
}

/// Request body for creating a [`Person`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPerson {
    pub name: String,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub geburtstag: Option<NaiveDate>,

    #[serde(default)]
    #[ts(optional)]
    pub telefonnummer: Option<String>,

    #[serde(default)]
    #[ts(optional)]
    pub email: Option<String>,
}

/// Partial update of a [`Person`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonUpdate {
    #[serde(default)]
    pub name: Patch<String>,

    #[serde(default)]
    pub geburtstag: Patch<NaiveDate>,

    #[serde(default)]
    pub telefonnummer: Patch<String>,

    #[serde(default)]
    pub email: Patch<String>,
}

// =============================================================================
// Buchung
// =============================================================================

/// Composite identity of a [`Buchung`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuchungKey {
    pub termin_id: TerminId,
    pub person_id: PersonId,
}

impl BuchungKey {
    #[inline]
    pub const fn new(termin_id: TerminId, person_id: PersonId) -> Self {
        BuchungKey {
            termin_id,
            person_id,
        }
    }
}

impl fmt::Display for BuchungKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.termin_id, self.person_id)
    }
}

/// A booking: a person holds a slot in an appointment.
///
/// The same shape is used for the create request and the response; the
/// (termin_id, person_id) pair is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Buchung {
    pub termin_id: TerminId,
    pub person_id: PersonId,
    /// Globally unique across all bookings.
    pub buchungsnummer: String,
}

impl Buchung {
    /// Returns the composite key of this booking.
    #[inline]
    pub fn key(&self) -> BuchungKey {
        BuchungKey::new(self.termin_id, self.person_id)
    }
}

/// Partial update of a [`Buchung`]. Only the booking number is mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuchungUpdate {
    #[serde(default)]
    pub buchungsnummer: Patch<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_termin_wire_shape() {
        let termin: Termin = serde_json::from_str(
            r#"{"termin_id": 4, "beginn": "2024-01-01T10:00", "ende": "2024-01-01T11:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(termin.beschreibung, None);

        let json = serde_json::to_value(&termin).unwrap();
        assert_eq!(json["beginn"], "2024-01-01T10:00:00");
        assert_eq!(json["ende"], "2024-01-01T11:00:00");
        assert_eq!(json["termin_id"], 4);
    }

    #[test]
    fn test_termin_update_distinguishes_null_and_omitted() {
        let update: TerminUpdate =
            serde_json::from_str(r#"{"beschreibung": null, "ende": "2024-01-01T12:00"}"#).unwrap();
        assert!(update.beginn.is_unset());
        assert!(matches!(update.ende, Patch::Value(_)));
        assert_eq!(update.beschreibung, Patch::Null);
    }

    #[test]
    fn test_termin_update_rejects_bad_timestamp() {
        let result: Result<TerminUpdate, _> = serde_json::from_str(r#"{"beginn": "gestern"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_person_optional_fields_default() {
        let person: NewPerson = serde_json::from_str(r#"{"name": "Ana"}"#).unwrap();
        assert_eq!(person.name, "Ana");
        assert_eq!(person.geburtstag, None);
        assert_eq!(person.telefonnummer, None);
    }

    #[test]
    fn test_buchung_key() {
        let buchung = Buchung {
            termin_id: 3,
            person_id: 9,
            buchungsnummer: "BK-1".into(),
        };
        assert_eq!(buchung.key(), BuchungKey::new(3, 9));
        assert_eq!(buchung.key().to_string(), "3/9");
    }
}
