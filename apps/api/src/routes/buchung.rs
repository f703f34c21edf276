use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use termin_core::{Buchung, BuchungFilter, BuchungKey, BuchungUpdate, PersonId, TerminId};
use tracing::info;

use super::Deleted;
use crate::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/buchungen", post(create_buchung).get(list_buchungen))
        .route(
            "/buchungen/{termin_id}/{person_id}",
            get(get_buchung)
                .put(update_buchung)
                .patch(update_buchung)
                .delete(delete_buchung),
        )
}

type KeyPath = Result<Path<(TerminId, PersonId)>, PathRejection>;

fn key(path: KeyPath) -> Result<BuchungKey, ApiError> {
    let Path((termin_id, person_id)) = path?;
    Ok(BuchungKey::new(termin_id, person_id))
}

async fn create_buchung(
    State(state): State<AppState>,
    payload: Result<Json<Buchung>, JsonRejection>,
) -> Result<Json<Buchung>, ApiError> {
    let Json(buchung) = payload?;
    let buchung = state.db.buchungen().insert(buchung).await?;

    info!(key = %buchung.key(), buchungsnummer = %buchung.buchungsnummer, "Buchung created");
    Ok(Json(buchung))
}

async fn list_buchungen(
    State(state): State<AppState>,
    filter: Result<Query<BuchungFilter>, QueryRejection>,
) -> Result<Json<Vec<Buchung>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(state.db.buchungen().search(&filter).await?))
}

async fn get_buchung(
    State(state): State<AppState>,
    path: KeyPath,
) -> Result<Json<Buchung>, ApiError> {
    Ok(Json(state.db.buchungen().get(key(path)?).await?))
}

async fn update_buchung(
    State(state): State<AppState>,
    path: KeyPath,
    payload: Result<Json<BuchungUpdate>, JsonRejection>,
) -> Result<Json<Buchung>, ApiError> {
    let key = key(path)?;
    let Json(update) = payload?;
    Ok(Json(state.db.buchungen().update(key, update).await?))
}

async fn delete_buchung(
    State(state): State<AppState>,
    path: KeyPath,
) -> Result<Json<Deleted>, ApiError> {
    let key = key(path)?;
    state.db.buchungen().delete(key).await?;

    info!(%key, "Buchung deleted");
    Ok(Json(Deleted {
        detail: "Buchung gelöscht",
    }))
}
