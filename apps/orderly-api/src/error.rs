//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Orderly                                │
//! │                                                                         │
//! │  Handler  Result<T, ApiError>                                          │
//! │     │                                                                   │
//! │     ├── bad JSON / query ──── JsonRejection ───────────┐               │
//! │     ├── domain rule ───────── CoreError ───────────────┤               │
//! │     ├── database ──────────── DbError ─────────────────┼──► ApiError   │
//! │     └── token / password ──── AuthError ───────────────┘      │        │
//! │                                                               ▼        │
//! │                                      status + {"code", "detail"}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged in full and answered with a generic detail.

use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use orderly_core::{CoreError, ValidationError};
use orderly_db::DbError;
use serde::Serialize;

/// Error returned from HTTP handlers.
///
/// ## Serialization
/// What a client receives when a request fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "detail": "Order not found"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable explanation
    pub detail: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Wrong username or password (401)
    InvalidCredentials,

    /// Missing, malformed, forged or expired bearer token (401)
    InvalidToken,

    /// Resource not found (404)
    NotFound,

    /// Input validation failed (422)
    ValidationError,

    /// Request conflicts with stored state (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidCredentials | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        ApiError {
            code,
            detail: detail.into(),
        }
    }

    /// Creates a not found error, e.g. `Order not found`.
    pub fn not_found(resource: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{resource} not found"))
    }

    /// Creates a validation error.
    pub fn validation(detail: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, detail)
    }

    /// Creates an invalid-token error.
    pub fn invalid_token() -> Self {
        ApiError::new(ErrorCode::InvalidToken, "Could not validate credentials")
    }

    /// Creates an invalid-credentials error.
    pub fn invalid_credentials() -> Self {
        ApiError::new(ErrorCode::InvalidCredentials, "Incorrect username or password")
    }

    /// Creates an internal error. The cause is logged, not returned.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "Internal error");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(&self)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(&entity),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(%message, "Foreign key violation");
                ApiError::new(ErrorCode::Conflict, "Resource is still referenced")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!(%message, "Check constraint violation");
                ApiError::validation("Value violates a data constraint")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database busy, try again")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Database operation failed");
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OrderNotFound(_) => ApiError::not_found("Order"),
            CoreError::ProductNotFound(_) => ApiError::not_found("Product"),
            e @ CoreError::ProductInUse { .. } => ApiError::new(ErrorCode::Conflict, e.to_string()),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
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

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.detail)
    }
}

impl std::error::Error for ApiError {}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
