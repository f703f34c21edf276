use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use termin_core::{NewPerson, Person, PersonFilter, PersonId, PersonUpdate};
use tracing::info;

use super::Deleted;
use crate::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/personen", post(create_person).get(list_personen))
        .route(
            "/personen/{person_id}",
            get(get_person)
                .put(update_person)
                .patch(update_person)
                .delete(delete_person),
        )
}

async fn create_person(
    State(state): State<AppState>,
    payload: Result<Json<NewPerson>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let Json(new) = payload?;
    let person = state.db.personen().insert(new).await?;

    info!(person_id = person.person_id, "Person created");
    Ok(Json(person))
}

async fn list_personen(
    State(state): State<AppState>,
    filter: Result<Query<PersonFilter>, QueryRejection>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(state.db.personen().search(&filter).await?))
}

async fn get_person(
    State(state): State<AppState>,
    id: Result<Path<PersonId>, PathRejection>,
) -> Result<Json<Person>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.db.personen().get(id).await?))
}

async fn update_person(
    State(state): State<AppState>,
    id: Result<Path<PersonId>, PathRejection>,
    payload: Result<Json<PersonUpdate>, JsonRejection>,
) -> Result<Json<Person>, ApiError> {
    let Path(id) = id?;
    let Json(update) = payload?;
    Ok(Json(state.db.personen().update(id, update).await?))
}

async fn delete_person(
    State(state): State<AppState>,
    id: Result<Path<PersonId>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path(id) = id?;
    let buchungen = state.db.personen().delete(id).await?;

    info!(person_id = id, buchungen, "Person deleted");
    Ok(Json(Deleted {
        detail: "Person gelöscht",
    }))
}
