//! # Search Filters
//!
//! Query parameters of the collection endpoints.
//!
//! ```text
//! GET /termine?von=..&bis=..&beschreibung=..
//! GET /personen?name=..&telefonnummer=..
//! GET /buchungen?termin_id=..&person_id=..&buchungsnummer=..
//! ```
//!
//! All filters are optional and combine with AND. Text values are trimmed
//! and empty strings count as absent. `beschreibung` and `name` match
//! case-insensitive substrings, every other filter matches exactly. The database layer applies the exact and
//! range filters; the substring filters run through `matches`.

use chrono::NaiveDateTime;
use serde::{de, Deserialize, Deserializer};

use crate::types::{Buchung, Person, PersonId, Termin, TerminId};

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

// Trimmed like the stored values; blank means absent.
fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("'{raw}' ist keine gültige ID"))),
        _ => Ok(None),
    }
}

fn text_matches(value: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => value.is_some_and(|v| contains_ignore_case(v, needle)),
    }
}

// =============================================================================
// Termin
// =============================================================================

/// Filter for `GET /termine`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TerminFilter {
    /// Appointments starting at or after this instant.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub von: Option<NaiveDateTime>,

    /// Appointments ending at or before this instant.
    #[serde(default, deserialize_with = "crate::timestamp::deserialize_option")]
    pub bis: Option<NaiveDateTime>,

    /// Substring of the description.
    #[serde(default, deserialize_with = "non_empty")]
    pub beschreibung: Option<String>,
}

impl TerminFilter {
    pub fn matches(&self, termin: &Termin) -> bool {
        self.von.map_or(true, |von| termin.beginn >= von)
            && self.bis.map_or(true, |bis| termin.ende <= bis)
            && text_matches(termin.beschreibung.as_deref(), self.beschreibung.as_deref())
    }
}

// =============================================================================
// Person
// =============================================================================

/// Filter for `GET /personen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PersonFilter {
    /// Substring of the name.
    #[serde(default, deserialize_with = "non_empty")]
    pub name: Option<String>,

    /// Exact phone number.
    #[serde(default, deserialize_with = "non_empty")]
    pub telefonnummer: Option<String>,
}

impl PersonFilter {
    pub fn matches(&self, person: &Person) -> bool {
        text_matches(Some(&person.name), self.name.as_deref())
            && self
                .telefonnummer
                .as_deref()
                .map_or(true, |tel| person.telefonnummer.as_deref() == Some(tel))
    }
}

// =============================================================================
// Buchung
// =============================================================================

/// Filter for `GET /buchungen`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BuchungFilter {
    #[serde(default, deserialize_with = "optional_id")]
    pub termin_id: Option<TerminId>,

    #[serde(default, deserialize_with = "optional_id")]
    pub person_id: Option<PersonId>,

    #[serde(default, deserialize_with = "non_empty")]
    pub buchungsnummer: Option<String>,
}

impl BuchungFilter {
    pub fn matches(&self, buchung: &Buchung) -> bool {
        self.termin_id.map_or(true, |id| buchung.termin_id == id)
            && self.person_id.map_or(true, |id| buchung.person_id == id)
            && self
                .buchungsnummer
                .as_deref()
                .map_or(true, |nr| buchung.buchungsnummer == nr)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
