//! HTTP routes.
//!
//! Handlers are thin: extract, call one repository operation, wrap the
//! result. All invariants live in `termin-db`.

mod buchung;
mod health;
mod person;
mod termin;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Confirmation payload of the delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub detail: &'static str,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(termin::routes())
        .merge(person::routes())
        .merge(buchung::routes())
        .merge(health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    cors.allow_origin(origins)
}
