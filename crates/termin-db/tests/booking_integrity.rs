//! End-to-end checks of the booking invariants against a real database file.

use chrono::{NaiveDate, NaiveDateTime};
use termin_core::{
    Buchung, BuchungFilter, BuchungKey, BuchungUpdate, CoreError, ErrorKind, NewPerson, NewTermin,
    Patch, PersonFilter, TerminFilter, TerminUpdate,
};
use termin_db::{Database, DbConfig, DbError};

fn ts(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn person(name: &str, telefonnummer: Option<&str>) -> NewPerson {
    NewPerson {
        name: name.to_string(),
        geburtstag: None,
        telefonnummer: telefonnummer.map(str::to_string),
        email: None,
    }
}

async fn file_db(dir: &tempfile::TempDir) -> Database {
    let config = DbConfig::new(dir.path().join("termine.db")).max_connections(8);
    Database::new(config).await.unwrap()
}

#[tokio::test]
async fn booking_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let a = db
        .termine()
        .insert(NewTermin {
            beginn: ts(1, 10, 0),
            ende: ts(1, 11, 0),
            beschreibung: None,
        })
        .await
        .unwrap();
    let p = db.personen().insert(person("Ana", Some("123"))).await.unwrap();

    db.buchungen()
        .insert(Buchung {
            termin_id: a.termin_id,
            person_id: p.person_id,
            buchungsnummer: "BK-1".into(),
        })
        .await
        .unwrap();

    let err = db
        .buchungen()
        .insert(Buchung {
            termin_id: a.termin_id,
            person_id: p.person_id,
            buchungsnummer: "BK-2".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(err.to_string(), "Buchung existiert bereits");

    let q = db.personen().insert(person("Ben", None)).await.unwrap();
    let err = db
        .buchungen()
        .insert(Buchung {
            termin_id: a.termin_id,
            person_id: q.person_id,
            buchungsnummer: "BK-1".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(err.to_string(), "Buchungsnummer bereits vergeben");

    let later = db
        .termine()
        .search(&TerminFilter {
            von: Some(ts(1, 10, 30)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(later.is_empty());

    let earlier = db
        .termine()
        .search(&TerminFilter {
            von: Some(ts(1, 9, 0)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(earlier.len(), 1);
    assert_eq!(earlier[0].termin_id, a.termin_id);
}

#[tokio::test]
async fn booking_for_missing_termin_creates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    let p = db.personen().insert(person("Ana", None)).await.unwrap();

    let err = db
        .buchungen()
        .insert(Buchung {
            termin_id: 404,
            person_id: p.person_id,
            buchungsnummer: "BK-1".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Rejected(CoreError::UnknownTermin(404))));
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert!(db
        .buchungen()
        .search(&BuchungFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn termin_delete_purges_its_bookings() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let a = db
        .termine()
        .insert(NewTermin {
            beginn: ts(1, 10, 0),
            ende: ts(1, 11, 0),
            beschreibung: Some("Kurs".into()),
        })
        .await
        .unwrap();
    for (i, name) in ["Ana", "Ben", "Cem"].iter().enumerate() {
        let p = db.personen().insert(person(name, None)).await.unwrap();
        db.buchungen()
            .insert(Buchung {
                termin_id: a.termin_id,
                person_id: p.person_id,
                buchungsnummer: format!("BK-{i}"),
            })
            .await
            .unwrap();
    }

    assert_eq!(db.termine().delete(a.termin_id).await.unwrap(), 3);

    let left = db
        .buchungen()
        .search(&BuchungFilter {
            termin_id: Some(a.termin_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(left.is_empty());
    assert_eq!(
        db.personen().search(&PersonFilter::default()).await.unwrap().len(),
        3
    );
}

#[tokio::test]
async fn partial_update_leaves_omitted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;
    let a = db
        .termine()
        .insert(NewTermin {
            beginn: ts(1, 10, 0),
            ende: ts(1, 11, 0),
            beschreibung: None,
        })
        .await
        .unwrap();

    let updated = db
        .termine()
        .update(
            a.termin_id,
            TerminUpdate {
                beschreibung: Patch::Value("Yoga".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.beginn, ts(1, 10, 0));
    assert_eq!(updated.ende, ts(1, 11, 0));
    assert_eq!(updated.beschreibung.as_deref(), Some("Yoga"));
}

// Concurrent claims of one booking number: the UNIQUE index decides.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_booking_number_claims_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let a = db
        .termine()
        .insert(NewTermin {
            beginn: ts(2, 8, 0),
            ende: ts(2, 9, 0),
            beschreibung: None,
        })
        .await
        .unwrap();

    let mut person_ids = Vec::new();
    for i in 0..8 {
        let p = db
            .personen()
            .insert(person(&format!("Person {i}"), None))
            .await
            .unwrap();
        person_ids.push(p.person_id);
    }

    let handles: Vec<_> = person_ids
        .into_iter()
        .map(|person_id| {
            let repo = db.buchungen();
            let termin_id = a.termin_id;
            tokio::spawn(async move {
                repo.insert(Buchung {
                    termin_id,
                    person_id,
                    buchungsnummer: "BK-RACE".into(),
                })
                .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(
                matches!(err, DbError::Rejected(CoreError::DuplicateBuchungsnummer(_))),
                "unexpected error: {err:?}"
            ),
        }
    }

    assert_eq!(winners, 1);
    let stored = db
        .buchungen()
        .search(&BuchungFilter {
            buchungsnummer: Some("BK-RACE".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_phone_claims_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let repo = db.personen();
            tokio::spawn(async move {
                repo.insert(person(&format!("Person {i}"), Some("030-555")))
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => assert!(
                matches!(err, DbError::Rejected(CoreError::TelefonnummerVergeben(_))),
                "unexpected error: {err:?}"
            ),
        }
    }

    assert_eq!(winners, 1);
}

// Concurrent bookings of one (termin, person) pair: the primary key decides
// and every loser reports the duplicate pair, not a raw storage error.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_pair_bookings_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let a = db
        .termine()
        .insert(NewTermin {
            beginn: ts(3, 8, 0),
            ende: ts(3, 9, 0),
            beschreibung: None,
        })
        .await
        .unwrap();
    let p = db.personen().insert(person("Ana", None)).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = db.buchungen();
            let key = BuchungKey::new(a.termin_id, p.person_id);
            tokio::spawn(async move {
                repo.insert(Buchung {
                    termin_id: key.termin_id,
                    person_id: key.person_id,
                    buchungsnummer: format!("BK-PAAR-{i}"),
                })
                .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(err) => {
                assert!(
                    matches!(err, DbError::Rejected(CoreError::DuplicateBuchung(_))),
                    "unexpected error: {err:?}"
                );
                assert_eq!(err.kind(), ErrorKind::BadRequest);
            }
        }
    }

    assert_eq!(winners, 1);
    let stored = db
        .buchungen()
        .search(&BuchungFilter {
            termin_id: Some(a.termin_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

// Several existing bookings renamed to the same number at once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_number_updates_have_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_db(&dir).await;

    let a = db
        .termine()
        .insert(NewTermin {
            beginn: ts(4, 8, 0),
            ende: ts(4, 9, 0),
            beschreibung: None,
        })
        .await
        .unwrap();

    let mut keys = Vec::new();
    for i in 0..6 {
        let p = db
            .personen()
            .insert(person(&format!("Person {i}"), None))
            .await
            .unwrap();
        let b = db
            .buchungen()
            .insert(Buchung {
                termin_id: a.termin_id,
                person_id: p.person_id,
                buchungsnummer: format!("BK-{i}"),
            })
            .await
            .unwrap();
        keys.push(b.key());
    }

    let handles: Vec<_> = keys
        .into_iter()
        .map(|key| {
            let repo = db.buchungen();
            tokio::spawn(async move {
                repo.update(
                    key,
                    BuchungUpdate {
                        buchungsnummer: Patch::Value("BK-NEU".into()),
                    },
                )
                .await
            })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(updated) => {
                winners += 1;
                assert_eq!(updated.buchungsnummer, "BK-NEU");
            }
            Err(err) => {
                assert!(
                    matches!(err, DbError::Rejected(CoreError::BuchungsnummerVergeben(_))),
                    "unexpected error: {err:?}"
                );
                assert_eq!(err.kind(), ErrorKind::Conflict);
            }
        }
    }

    assert_eq!(winners, 1);
    let holders = db
        .buchungen()
        .search(&BuchungFilter {
            buchungsnummer: Some("BK-NEU".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(holders.len(), 1);
}
