use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use termin_core::{NewTermin, Termin, TerminFilter, TerminId, TerminUpdate};
use tracing::info;

use super::Deleted;
use crate::{ApiError, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/termine", post(create_termin).get(list_termine))
        .route(
            "/termine/{termin_id}",
            get(get_termin)
                .put(update_termin)
                .patch(update_termin)
                .delete(delete_termin),
        )
}

async fn create_termin(
    State(state): State<AppState>,
    payload: Result<Json<NewTermin>, JsonRejection>,
) -> Result<Json<Termin>, ApiError> {
    let Json(new) = payload?;
    let termin = state.db.termine().insert(new).await?;

    info!(termin_id = termin.termin_id, "Termin created");
    Ok(Json(termin))
}

async fn list_termine(
    State(state): State<AppState>,
    filter: Result<Query<TerminFilter>, QueryRejection>,
) -> Result<Json<Vec<Termin>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(state.db.termine().search(&filter).await?))
}

async fn get_termin(
    State(state): State<AppState>,
    id: Result<Path<TerminId>, PathRejection>,
) -> Result<Json<Termin>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.db.termine().get(id).await?))
}

async fn update_termin(
    State(state): State<AppState>,
    id: Result<Path<TerminId>, PathRejection>,
    payload: Result<Json<TerminUpdate>, JsonRejection>,
) -> Result<Json<Termin>, ApiError> {
    let Path(id) = id?;
    let Json(update) = payload?;
    Ok(Json(state.db.termine().update(id, update).await?))
}

async fn delete_termin(
    State(state): State<AppState>,
    id: Result<Path<TerminId>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path(id) = id?;
    let buchungen = state.db.termine().delete(id).await?;

    info!(termin_id = id, buchungen, "Termin deleted");
    Ok(Json(Deleted {
        detail: "Termin gelöscht",
    }))
}
