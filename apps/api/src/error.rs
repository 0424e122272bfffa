//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Apotheca                               │
//! │                                                                         │
//! │  Handler: Result<Json<T>, ApiError>                                     │
//! │         │                                                               │
//! │         ├── DbError::NotFound ─────────────────► 404 NOT_FOUND          │
//! │         ├── CoreError::InsufficientStock ──────► 400 INSUFFICIENT_STOCK │
//! │         ├── CoreError::Validation / rules ─────► 400 VALIDATION_ERROR   │
//! │         ├── DbError::UniqueViolation ──────────► 400 DUPLICATE          │
//! │         ├── DbError::ForeignKeyViolation ──────► 400 INVALID_REFERENCE  │
//! │         ├── bad JSON / query string ───────────► 400 BAD_REQUEST        │
//! │         └── anything else ─── logged ──────────► 500 DATABASE_ERROR     │
//! │                                                                         │
//! │  Body:  { "code": "INSUFFICIENT_STOCK",                                 │
//! │           "message": "Insufficient stock for Paracetamol 500mg ..." }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures never leak their detail to the client; the detail is
//! logged with `error!` and the response carries a generic message.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use apotheca_core::CoreError;
use apotheca_db::DbError;

/// Error body returned by every failing endpoint.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Sale not found: 7d1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
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

    /// Input or business rule validation failed (400)
    ValidationError,

    /// A batch cannot cover a line (400)
    InsufficientStock,

    /// Unique business identifier already taken (400)
    Duplicate,

    /// Record still referenced, or references something missing (400)
    InvalidReference,

    /// Body or query string could not be parsed (400)
    BadRequest,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::Duplicate
            | ErrorCode::InvalidReference
            | ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::Duplicate, err.to_string()),
            DbError::ForeignKeyViolation { message } => {
                warn!("Foreign key violation: {}", message);
                ApiError::new(
                    ErrorCode::InvalidReference,
                    "Record is referenced by other records or refers to a missing record",
                )
            }
            DbError::CheckViolation(message) => ApiError::validation(message),
            DbError::Domain(core) => ApiError::from(core),
            DbError::ConnectionFailed(e) => {
                error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::PoolExhausted => {
                error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::BatchItemMismatch { .. }
            | CoreError::BankAccountRequired
            | CoreError::DiscountTooLarge { .. }
            | CoreError::TooManyLines { .. } => ApiError::validation(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorCode::BadRequest, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorCode::BadRequest, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use apotheca_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = DbError::not_found("Sale", "x").into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);

        let err: ApiError = DbError::from(CoreError::InsufficientStock {
            item: "Paracetamol".to_string(),
            batch: "B-1".to_string(),
            available: 2,
            requested: 5,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = DbError::ForeignKeyViolation {
            message: "FOREIGN KEY constraint failed".to_string(),
        }
        .into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_serialized_shape() {
        let err: ApiError = CoreError::from(ValidationError::required("items")).into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["message"], "items is required");
    }
}
