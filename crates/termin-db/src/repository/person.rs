//! # Person Repository
//!
//! Database operations for people.
//!
//! ## Phone Number Uniqueness
//! A phone number identifies at most one person. The repository checks this
//! before writing so the caller gets `TelefonnummerVergeben`; the UNIQUE
//! index on `person.telefonnummer` catches requests that race past the check
//! and is translated into the same error.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use termin_core::{CoreError, NewPerson, Person, PersonFilter, PersonId, PersonUpdate};

const COLUMNS: &str = "person_id, name, geburtstag, telefonnummer, email";

const TELEFONNUMMER_COLUMN: &str = "person.telefonnummer";

/// Repository for person database operations.
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: SqlitePool,
}

impl PersonRepository {
    /// Creates a new PersonRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PersonRepository { pool }
    }

    /// Gets a person by their ID.
    pub async fn get_by_id(&self, id: PersonId) -> DbResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(&format!(
            "SELECT {COLUMNS} FROM person WHERE person_id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    /// Gets a person, failing with `PersonNotFound` if absent.
    pub async fn get(&self, id: PersonId) -> DbResult<Person> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::PersonNotFound(id).into())
    }

    /// Checks whether a person exists.
    pub async fn exists(&self, id: PersonId) -> DbResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM person WHERE person_id = ?1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    /// Checks whether a phone number is held by someone other than `exclude`.
    pub async fn phone_taken(
        &self,
        telefonnummer: &str,
        exclude: Option<PersonId>,
    ) -> DbResult<bool> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM person WHERE telefonnummer = ?1 AND person_id IS NOT ?2)",
        )
        .bind(telefonnummer)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(taken)
    }

    /// Creates a person and returns them with their new ID.
    ///
    /// ## Errors
    /// * `Validation` - Name missing or too long, malformed email, ...
    /// * `TelefonnummerVergeben` - Phone number already in use
    pub async fn insert(&self, new: NewPerson) -> DbResult<Person> {
        let new = new.validated()?;

        if let Some(telefonnummer) = &new.telefonnummer {
            if self.phone_taken(telefonnummer, None).await? {
                return Err(CoreError::TelefonnummerVergeben(telefonnummer.clone()).into());
            }
        }

        debug!(name = %new.name, "Inserting person");

        let telefonnummer = new.telefonnummer.clone();
        let person = sqlx::query_as::<_, Person>(&format!(
            "INSERT INTO person (name, geburtstag, telefonnummer, email) \
             VALUES (?1, ?2, ?3, ?4) RETURNING {COLUMNS}"
        ))
        .bind(new.name)
        .bind(new.geburtstag)
        .bind(new.telefonnummer)
        .bind(new.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| phone_conflict(DbError::from(err), telefonnummer))?;

        debug!(person_id = person.person_id, "Person created");
        Ok(person)
    }

    /// Applies a partial update.
    ///
    /// ## Errors
    /// * `Validation` - `name` set to null, field rules
    /// * `PersonNotFound` - No person with this ID
    /// * `TelefonnummerVergeben` - New phone number held by another person
    pub async fn update(&self, id: PersonId, update: PersonUpdate) -> DbResult<Person> {
        let changes = update.into_changes()?;

        if changes.is_empty() {
            return self.get(id).await;
        }

        let telefonnummer = changes.new_telefonnummer().map(str::to_string);
        if let Some(telefonnummer) = &telefonnummer {
            self.get(id).await?;
            if self.phone_taken(telefonnummer, Some(id)).await? {
                return Err(CoreError::TelefonnummerVergeben(telefonnummer.clone()).into());
            }
        }

        debug!(person_id = id, ?changes, "Updating person");

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE person SET ");
        {
            let mut set = query.separated(", ");
            if let Some(name) = changes.name {
                set.push("name = ").push_bind_unseparated(name);
            }
            if let Some(geburtstag) = changes.geburtstag {
                set.push("geburtstag = ").push_bind_unseparated(geburtstag);
            }
            if let Some(telefonnummer) = changes.telefonnummer {
                set.push("telefonnummer = ")
                    .push_bind_unseparated(telefonnummer);
            }
            if let Some(email) = changes.email {
                set.push("email = ").push_bind_unseparated(email);
            }
        }
        query
            .push(" WHERE person_id = ")
            .push_bind(id)
            .push(format!(" RETURNING {COLUMNS}"));

        query
            .build_query_as::<Person>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| phone_conflict(DbError::from(err), telefonnummer))?
            .ok_or_else(|| CoreError::PersonNotFound(id).into())
    }

    /// Deletes a person together with all of their bookings.
    ///
    /// ## Returns
    /// Number of bookings removed with the person.
    pub async fn delete(&self, id: PersonId) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let buchungen = sqlx::query("DELETE FROM buchung WHERE person_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM person WHERE person_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(CoreError::PersonNotFound(id).into());
        }

        tx.commit().await?;

        debug!(person_id = id, buchungen, "Person deleted");
        Ok(buchungen)
    }

    /// Lists people matching the filter, ordered by name.
    pub async fn search(&self, filter: &PersonFilter) -> DbResult<Vec<Person>> {
        debug!(?filter, "Searching personen");

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM person WHERE 1 = 1"));
        if let Some(telefonnummer) = &filter.telefonnummer {
            query
                .push(" AND telefonnummer = ")
                .push_bind(telefonnummer.clone());
        }
        query.push(" ORDER BY name, person_id");

        let personen = query
            .build_query_as::<Person>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter(|person| filter.matches(person))
            .collect::<Vec<_>>();

        debug!(count = personen.len(), "Search returned personen");
        Ok(personen)
    }
}

/// Translates a UNIQUE violation on the phone column into the domain error.
fn phone_conflict(err: DbError, telefonnummer: Option<String>) -> DbError {
    match telefonnummer {
        Some(telefonnummer) if err.is_unique_violation_on(TELEFONNUMMER_COLUMN) => {
            warn!(%telefonnummer, "Phone number claimed concurrently");
            CoreError::TelefonnummerVergeben(telefonnummer).into()
        }
        _ => err,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{db, person, termin};
    use termin_core::{Buchung, Patch};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = db().await;
        let repo = db.personen();

        let created = repo.insert(person("Ana", Some("0301"))).await.unwrap();
        let loaded = repo.get(created.person_id).await.unwrap();

        assert_eq!(created, loaded);
        assert_eq!(loaded.telefonnummer.as_deref(), Some("0301"));
    }

    #[tokio::test]
    async fn test_duplicate_phone_on_insert() {
        let db = db().await;
        let repo = db.personen();
        repo.insert(person("Ana", Some("0301"))).await.unwrap();

        let err = repo.insert(person("Ben", Some("0301"))).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Rejected(CoreError::TelefonnummerVergeben(_))
        ));
        assert_eq!(err.to_string(), "Telefonnummer bereits vergeben");
    }

    #[tokio::test]
    async fn test_people_without_phone_do_not_collide() {
        let db = db().await;
        let repo = db.personen();

        repo.insert(person("Ana", None)).await.unwrap();
        repo.insert(person("Ben", Some(" "))).await.unwrap();
        repo.insert(person("Cem", None)).await.unwrap();

        assert_eq!(repo.search(&PersonFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_phone_excludes_self() {
        let db = db().await;
        let repo = db.personen();
        let ana = repo.insert(person("Ana", Some("0301"))).await.unwrap();
        let ben = repo.insert(person("Ben", Some("0302"))).await.unwrap();

        let same = repo
            .update(
                ana.person_id,
                PersonUpdate {
                    telefonnummer: Patch::Value("0301".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(same.telefonnummer.as_deref(), Some("0301"));

        let err = repo
            .update(
                ben.person_id,
                PersonUpdate {
                    telefonnummer: Patch::Value("0301".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Rejected(CoreError::TelefonnummerVergeben(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_person_is_not_found() {
        let db = db().await;
        let repo = db.personen();
        repo.insert(person("Ana", Some("0301"))).await.unwrap();

        let err = repo
            .update(
                77,
                PersonUpdate {
                    telefonnummer: Patch::Value("0301".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rejected(CoreError::PersonNotFound(77))));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = db().await;
        let repo = db.personen();
        let ana = repo.insert(person("Ana", Some("0301"))).await.unwrap();

        let updated = repo
            .update(
                ana.person_id,
                PersonUpdate {
                    email: Patch::Value("ana@example.org".into()),
                    telefonnummer: Patch::Null,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.telefonnummer, None);
        assert_eq!(updated.email.as_deref(), Some("ana@example.org"));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_buchungen() {
        let db = db().await;
        let ana = db.personen().insert(person("Ana", None)).await.unwrap();
        let t = db.termine().insert(termin(1, 9, None)).await.unwrap();
        db.buchungen()
            .insert(Buchung {
                termin_id: t.termin_id,
                person_id: ana.person_id,
                buchungsnummer: "BK-1".into(),
            })
            .await
            .unwrap();

        let removed = db.personen().delete(ana.person_id).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!db.personen().exists(ana.person_id).await.unwrap());
        assert!(db.termine().exists(t.termin_id).await.unwrap());
        assert!(db
            .buchungen()
            .search(&Default::default())
            .await
            .unwrap()
            .is_empty());

        let err = db.personen().delete(ana.person_id).await.unwrap_err();
        assert!(matches!(err, DbError::Rejected(CoreError::PersonNotFound(_))));
    }

    #[tokio::test]
    async fn test_search_by_name_and_phone() {
        let db = db().await;
        let repo = db.personen();
        repo.insert(person("Zoe Müller", Some("0301"))).await.unwrap();
        repo.insert(person("Anna Müller", Some("0302"))).await.unwrap();
        repo.insert(person("Ben Schmidt", None)).await.unwrap();

        let muellers = repo
            .search(&PersonFilter {
                name: Some("MÜLLER".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = muellers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Anna Müller", "Zoe Müller"]);

        let by_phone = repo
            .search(&PersonFilter {
                telefonnummer: Some("0302".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Anna Müller");
    }
}
