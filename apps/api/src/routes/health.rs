use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if !state.db.health_check().await {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "database": false })),
        );
    }

    let migrations = match state.db.migration_status().await {
        Ok((total, applied)) => json!({ "total": total, "applied": applied }),
        Err(err) => {
            tracing::warn!(error = %err, "Could not read migration status");
            Value::Null
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "database": true, "migrations": migrations })),
    )
}
