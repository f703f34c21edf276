//! # Termin Repository
//!
//! Database operations for appointments.
//!
//! ## Delete Cascade
//! ```text
//! BEGIN
//!   DELETE FROM buchung WHERE termin_id = ?   ← takes the write lock
//!   DELETE FROM termin  WHERE termin_id = ?
//!     └── 0 rows? ROLLBACK → TerminNotFound  (bookings untouched)
//! COMMIT
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use termin_core::{CoreError, NewTermin, Termin, TerminFilter, TerminId, TerminUpdate};

const COLUMNS: &str = "termin_id, beginn, ende, beschreibung";

/// Repository for appointment database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = TerminRepository::new(pool);
///
/// let termin = repo.insert(new_termin).await?;
/// let termine = repo.search(&TerminFilter::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TerminRepository {
    pool: SqlitePool,
}

impl TerminRepository {
    /// Creates a new TerminRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TerminRepository { pool }
    }

    /// Gets an appointment by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Termin))` - Appointment found
    /// * `Ok(None)` - Appointment not found
    pub async fn get_by_id(&self, id: TerminId) -> DbResult<Option<Termin>> {
        let termin = sqlx::query_as::<_, Termin>(&format!(
            "SELECT {COLUMNS} FROM termin WHERE termin_id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(termin)
    }

    /// Gets an appointment, failing with `TerminNotFound` if absent.
    pub async fn get(&self, id: TerminId) -> DbResult<Termin> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::TerminNotFound(id).into())
    }

    /// Checks whether an appointment exists.
    pub async fn exists(&self, id: TerminId) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM termin WHERE termin_id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Creates an appointment and returns it with its new ID.
    pub async fn insert(&self, new: NewTermin) -> DbResult<Termin> {
        let new = new.validated()?;

        debug!(beginn = %new.beginn, ende = %new.ende, "Inserting termin");

        let termin = sqlx::query_as::<_, Termin>(&format!(
            "INSERT INTO termin (beginn, ende, beschreibung) VALUES (?1, ?2, ?3) RETURNING {COLUMNS}"
        ))
        .bind(new.beginn)
        .bind(new.ende)
        .bind(new.beschreibung)
        .fetch_one(&self.pool)
        .await?;

        debug!(termin_id = termin.termin_id, "Termin created");
        Ok(termin)
    }

    /// Applies a partial update.
    ///
    /// Only fields present in the request are written. An update that
    /// touches nothing returns the stored appointment unchanged.
    ///
    /// ## Errors
    /// * `Validation` - `beginn`/`ende` set to null, description too long
    /// * `TerminNotFound` - No appointment with this ID
    pub async fn update(&self, id: TerminId, update: TerminUpdate) -> DbResult<Termin> {
        let changes = update.into_changes()?;

        if changes.is_empty() {
            return self.get(id).await;
        }

        debug!(termin_id = id, ?changes, "Updating termin");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE termin SET ");
        {
            let mut set = query.separated(", ");
            if let Some(beginn) = changes.beginn {
                set.push("beginn = ").push_bind_unseparated(beginn);
            }
            if let Some(ende) = changes.ende {
                set.push("ende = ").push_bind_unseparated(ende);
            }
            if let Some(beschreibung) = changes.beschreibung {
                set.push("beschreibung = ").push_bind_unseparated(beschreibung);
            }
        }
        query
            .push(" WHERE termin_id = ")
            .push_bind(id)
            .push(format!(" RETURNING {COLUMNS}"));

        query
            .build_query_as::<Termin>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| CoreError::TerminNotFound(id).into())
    }

    /// Deletes an appointment together with all of its bookings.
    ///
    /// ## Returns
    /// Number of bookings removed with the appointment.
    ///
    /// ## Errors
    /// * `TerminNotFound` - Nothing is deleted
    pub async fn delete(&self, id: TerminId) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let buchungen = sqlx::query("DELETE FROM buchung WHERE termin_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM termin WHERE termin_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(CoreError::TerminNotFound(id).into());
        }

        tx.commit().await?;

        debug!(termin_id = id, buchungen, "Termin deleted");
        Ok(buchungen)
    }

    /// Lists appointments matching the filter, ordered by start time.
    pub async fn search(&self, filter: &TerminFilter) -> DbResult<Vec<Termin>> {
        debug!(?filter, "Searching termine");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM termin WHERE 1 = 1"));
        if let Some(von) = filter.von {
            query.push(" AND beginn >= ").push_bind(von);
        }
        if let Some(bis) = filter.bis {
            query.push(" AND ende <= ").push_bind(bis);
        }
        if filter.beschreibung.is_some() {
            query.push(" AND beschreibung IS NOT NULL");
        }
        query.push(" ORDER BY beginn, termin_id");

        let termine = query
            .build_query_as::<Termin>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter(|termin| filter.matches(termin))
            .collect::<Vec<_>>();

        debug!(count = termine.len(), "Search returned termine");
        Ok(termine)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
