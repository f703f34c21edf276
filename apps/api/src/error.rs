//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the API                                │
//! │                                                                         │
//! │  Handler                                                               │
//! │  Result<Json<T>, ApiError>                                             │
//! │         │                                                               │
//! │         ├── JSON / query / path rejected ─────► 400 VALIDATION_ERROR   │
//! │         │                                                               │
//! │         ├── DbError::Rejected(CoreError) ─┬───► 404 NOT_FOUND          │
//! │         │                                 ├───► 400 BAD_REQUEST        │
//! │         │                                 ├───► 400 VALIDATION_ERROR   │
//! │         │                                 └───► 409 CONFLICT           │
//! │         │                                                               │
//! │         └── any other DbError ─── logged ─────► 500 DATABASE_ERROR     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use termin_core::{CoreError, ErrorKind};
use termin_db::DbError;

/// API error returned from handlers.
///
/// ## Serialization
/// This is what the client receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Termin nicht gefunden"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Request references something invalid (400)
    BadRequest,

    /// Input validation failed (400)
    ValidationError,

    /// Uniqueness conflict (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::BadRequest | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match (&err, err.kind()) {
            (CoreError::Validation(_), _) => ErrorCode::ValidationError,
            (_, ErrorKind::NotFound) => ErrorCode::NotFound,
            (_, ErrorKind::Conflict) => ErrorCode::Conflict,
            (_, ErrorKind::BadRequest) => ErrorCode::BadRequest,
            (_, ErrorKind::Internal) => ErrorCode::DatabaseError,
        };
        ApiError::new(code, err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rejected(core) => core.into(),
            DbError::NotFound { entity, id } => {
                ApiError::new(ErrorCode::NotFound, format!("{entity} nicht gefunden: {id}"))
            }
            DbError::UniqueViolation { field, .. } => {
                tracing::warn!(%field, "Unmapped unique violation");
                ApiError::new(ErrorCode::Conflict, "Wert bereits vergeben")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Unmapped foreign key violation");
                ApiError::new(ErrorCode::BadRequest, "Ungültige Referenz")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Datenbankfehler")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termin_core::{BuchungKey, ValidationError};

    #[test]
    fn test_core_error_codes() {
        let not_found: ApiError = CoreError::TerminNotFound(1).into();
        assert_eq!(not_found.code, ErrorCode::NotFound);
        assert_eq!(not_found.message, "Termin nicht gefunden");

        let duplicate: ApiError = CoreError::DuplicateBuchung(BuchungKey::new(1, 2)).into();
        assert_eq!(duplicate.code, ErrorCode::BadRequest);

        let conflict: ApiError = CoreError::TelefonnummerVergeben("1".into()).into();
        assert_eq!(conflict.code.status(), StatusCode::CONFLICT);

        let invalid: ApiError = CoreError::Validation(ValidationError::required("name")).into();
        assert_eq!(invalid.code, ErrorCode::ValidationError);
        assert_eq!(invalid.code.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err: ApiError = DbError::QueryFailed("no such table: termin".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("termin"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::new(ErrorCode::Conflict, "x")).unwrap();
        assert_eq!(json, serde_json::json!({"code": "CONFLICT", "message": "x"}));
    }
}
