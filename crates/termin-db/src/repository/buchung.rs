//! # Buchung Repository
//!
//! Database operations for bookings.
//!
//! ## Creation Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(Buchung { termin_id, person_id, buchungsnummer })              │
//! │                                                                         │
//! │  1. Termin exists?                   no → UnknownTermin                │
//! │  2. Person exists?                   no → UnknownPerson                │
//! │  3. (termin_id, person_id) free?     no → DuplicateBuchung             │
//! │  4. buchungsnummer free?             no → DuplicateBuchungsnummer      │
//! │  5. INSERT … RETURNING                                                 │
//! │       ├── PRIMARY KEY violation      → DuplicateBuchung                │
//! │       ├── UNIQUE(buchungsnummer)     → DuplicateBuchungsnummer         │
//! │       └── FOREIGN KEY violation      → UnknownTermin / UnknownPerson   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The checks run in this order and the first failure wins. Step 5 only
//! fails when another request changed the store between the checks and the
//! write.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{PersonRepository, TerminRepository};
use termin_core::{Buchung, BuchungFilter, BuchungKey, BuchungUpdate, CoreError};

const COLUMNS: &str = "termin_id, person_id, buchungsnummer";

const BUCHUNGSNUMMER_COLUMN: &str = "buchung.buchungsnummer";
const KEY_COLUMN: &str = "buchung.person_id";

/// Repository for booking database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = BuchungRepository::new(pool);
///
/// let buchung = repo.insert(Buchung { termin_id: 1, person_id: 2, buchungsnummer: "BK-1".into() }).await?;
/// let same = repo.get(buchung.key()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BuchungRepository {
    pool: SqlitePool,
}

impl BuchungRepository {
    /// Creates a new BuchungRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BuchungRepository { pool }
    }

    fn termine(&self) -> TerminRepository {
        TerminRepository::new(self.pool.clone())
    }

    fn personen(&self) -> PersonRepository {
        PersonRepository::new(self.pool.clone())
    }

    /// Gets a booking by its composite key.
    pub async fn get_by_key(&self, key: BuchungKey) -> DbResult<Option<Buchung>> {
        let buchung = sqlx::query_as::<_, Buchung>(&format!(
            "SELECT {COLUMNS} FROM buchung WHERE termin_id = ?1 AND person_id = ?2"
        ))
        .bind(key.termin_id)
        .bind(key.person_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(buchung)
    }

    /// Gets a booking, failing with `BuchungNotFound` if absent.
    pub async fn get(&self, key: BuchungKey) -> DbResult<Buchung> {
        self.get_by_key(key)
            .await?
            .ok_or_else(|| CoreError::BuchungNotFound(key).into())
    }

    /// Checks whether a booking number is used by a booking other than `exclude`.
    pub async fn number_taken(
        &self,
        buchungsnummer: &str,
        exclude: Option<BuchungKey>,
    ) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM buchung WHERE buchungsnummer = ?1 \
             AND NOT (termin_id IS ?2 AND person_id IS ?3))",
        )
        .bind(buchungsnummer)
        .bind(exclude.map(|k| k.termin_id))
        .bind(exclude.map(|k| k.person_id))
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Creates a booking.
    ///
    /// ## Errors
    /// * `Validation` - Booking number blank or too long
    /// * `UnknownTermin` / `UnknownPerson` - Referenced entity missing
    /// * `DuplicateBuchung` - Pair already booked
    /// * `DuplicateBuchungsnummer` - Number already in use
    pub async fn insert(&self, buchung: Buchung) -> DbResult<Buchung> {
        let buchung = buchung.validated()?;
        let key = buchung.key();

        if !self.termine().exists(key.termin_id).await? {
            return Err(CoreError::UnknownTermin(key.termin_id).into());
        }
        if !self.personen().exists(key.person_id).await? {
            return Err(CoreError::UnknownPerson(key.person_id).into());
        }
        if self.get_by_key(key).await?.is_some() {
            return Err(CoreError::DuplicateBuchung(key).into());
        }
        if self.number_taken(&buchung.buchungsnummer, None).await? {
            return Err(CoreError::DuplicateBuchungsnummer(buchung.buchungsnummer).into());
        }

        debug!(%key, buchungsnummer = %buchung.buchungsnummer, "Inserting buchung");

        let result = sqlx::query_as::<_, Buchung>(&format!(
            "INSERT INTO buchung (termin_id, person_id, buchungsnummer) \
             VALUES (?1, ?2, ?3) RETURNING {COLUMNS}"
        ))
        .bind(key.termin_id)
        .bind(key.person_id)
        .bind(&buchung.buchungsnummer)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => Ok(created),
            Err(err) => Err(self.insert_conflict(DbError::from(err), buchung).await),
        }
    }

    /// Maps a constraint violation raised by the insert to the error the
    /// matching check would have produced.
    async fn insert_conflict(&self, err: DbError, buchung: Buchung) -> DbError {
        let key = buchung.key();

        let translated = if err.is_unique_violation_on(KEY_COLUMN) {
            CoreError::DuplicateBuchung(key)
        } else if err.is_unique_violation_on(BUCHUNGSNUMMER_COLUMN) {
            CoreError::DuplicateBuchungsnummer(buchung.buchungsnummer)
        } else if err.is_foreign_key_violation() {
            match self.termine().exists(key.termin_id).await {
                Ok(false) => CoreError::UnknownTermin(key.termin_id),
                Ok(true) => CoreError::UnknownPerson(key.person_id),
                Err(recheck) => return recheck,
            }
        } else {
            return err;
        };

        warn!(%key, error = %translated, "Booking constraint hit after checks passed");
        translated.into()
    }

    /// Changes the booking number of an existing booking.
    ///
    /// ## Errors
    /// * `Validation` - Number set to null, blank or too long
    /// * `BuchungNotFound` - No booking with this key
    /// * `BuchungsnummerVergeben` - Number held by a different booking
    pub async fn update(&self, key: BuchungKey, update: BuchungUpdate) -> DbResult<Buchung> {
        let Some(buchungsnummer) = update.into_changes()? else {
            return self.get(key).await;
        };

        let current = self.get(key).await?;
        if current.buchungsnummer == buchungsnummer {
            return Ok(current);
        }
        if self.number_taken(&buchungsnummer, Some(key)).await? {
            return Err(CoreError::BuchungsnummerVergeben(buchungsnummer).into());
        }

        debug!(%key, %buchungsnummer, "Updating buchung");

        let result = sqlx::query_as::<_, Buchung>(&format!(
            "UPDATE buchung SET buchungsnummer = ?1 \
             WHERE termin_id = ?2 AND person_id = ?3 RETURNING {COLUMNS}"
        ))
        .bind(&buchungsnummer)
        .bind(key.termin_id)
        .bind(key.person_id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(CoreError::BuchungNotFound(key).into()),
            Err(err) => Err(update_conflict(DbError::from(err), key, buchungsnummer)),
        }
    }

    /// Deletes a booking.
    pub async fn delete(&self, key: BuchungKey) -> DbResult<()> {
        let deleted = sqlx::query("DELETE FROM buchung WHERE termin_id = ?1 AND person_id = ?2")
            .bind(key.termin_id)
            .bind(key.person_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(CoreError::BuchungNotFound(key).into());
        }

        debug!(%key, "Buchung deleted");
        Ok(())
    }

    /// Lists bookings matching the filter, in storage order.
    pub async fn search(&self, filter: &BuchungFilter) -> DbResult<Vec<Buchung>> {
        debug!(?filter, "Searching buchungen");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM buchung WHERE 1 = 1"));
        if let Some(termin_id) = filter.termin_id {
            query.push(" AND termin_id = ").push_bind(termin_id);
        }
        if let Some(person_id) = filter.person_id {
            query.push(" AND person_id = ").push_bind(person_id);
        }
        if let Some(buchungsnummer) = &filter.buchungsnummer {
            query
                .push(" AND buchungsnummer = ")
                .push_bind(buchungsnummer.clone());
        }

        let buchungen = query.build_query_as::<Buchung>().fetch_all(&self.pool).await?;

        debug!(count = buchungen.len(), "Search returned buchungen");
        Ok(buchungen)
    }
}

/// Maps a UNIQUE(buchungsnummer) violation raised by an update to
/// `BuchungsnummerVergeben`.
fn update_conflict(err: DbError, key: BuchungKey, buchungsnummer: String) -> DbError {
    if !err.is_unique_violation_on(BUCHUNGSNUMMER_COLUMN) {
        return err;
    }

    warn!(%key, %buchungsnummer, "Booking number claimed concurrently");
    CoreError::BuchungsnummerVergeben(buchungsnummer).into()
}

// =============================================================================
// Unit Tests
// =============================================================================
