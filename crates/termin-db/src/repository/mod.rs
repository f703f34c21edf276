//! # Repository Module
//!
//! Database repository implementations for the Terminverwaltung.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Guarded Repositories                                 │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.buchungen().insert(buchung)                                │
//! │       ▼                                                                 │
//! │  BuchungRepository                                                     │
//! │  ├── 1. validate + normalise request            (termin-core)          │
//! │  ├── 2. invariant checks on the pool            (precise messages)     │
//! │  └── 3. single atomic write (… RETURNING)                              │
//! │            │                                                            │
//! │            ├── ok ─────────────────────────────► entity                │
//! │            └── UNIQUE / FOREIGN KEY violation                          │
//! │                  └── translated to the same CoreError as step 2        │
//! │                                                                         │
//! │  Two requests racing past step 2 both reach step 3; SQLite lets        │
//! │  exactly one of them win and the loser gets the domain error.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TerminRepository`] - Appointments, cascading delete
//! - [`PersonRepository`] - People, phone number uniqueness
//! - [`BuchungRepository`] - Bookings, composite key and booking number rules

pub mod buchung;
pub mod person;
pub mod termin;

pub use buchung::BuchungRepository;
pub use person::PersonRepository;
pub use termin::TerminRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};
    use termin_core::{NewPerson, NewTermin};

    use crate::{Database, DbConfig};

    pub async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub fn termin(day: u32, hour: u32, beschreibung: Option<&str>) -> NewTermin {
        NewTermin {
            beginn: at(day, hour),
            ende: at(day, hour + 1),
            beschreibung: beschreibung.map(str::to_string),
        }
    }

    pub fn person(name: &str, telefonnummer: Option<&str>) -> NewPerson {
        NewPerson {
            name: name.to_string(),
            geburtstag: None,
            telefonnummer: telefonnummer.map(str::to_string),
            email: None,
        }
    }
}
