// Error handling for the booking, payment, profile and catalog endpoints
// Provides a shared error type and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::AuthError;

/// Main error type for the non-auth API
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Field-level validation errors from the validator crate
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Missing or malformed input, or a request the current state forbids
    /// Maps to HTTP 400 Bad Request
    BadRequest(String),

    /// Resource not found
    /// Maps to HTTP 404 Not Found
    NotFound(String),

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    DatabaseError(sqlx::Error),

    /// Upstream catalog failures
    /// Maps to HTTP 500 Internal Server Error
    Upstream(String),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),
}

/// Consistent error response structure
///
/// Provides both a machine-readable `error_code` and a human-readable `message`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR", "NOT_FOUND")
    pub error_code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (e.g., field-level validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(error_code: &str, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.to_string(),
            message: message.into(),
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// 500-level causes are logged in full and replaced by a generic message.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                let mut response = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed");
                response.details =
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (StatusCode::BAD_REQUEST, response)
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                (StatusCode::BAD_REQUEST, ErrorResponse::new("BAD_REQUEST", message.clone()))
            }
            ApiError::NotFound(message) => {
                debug!("Resource not found: {}", message);
                (StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", message.clone()))
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("DATABASE_ERROR", "A database error occurred"),
                )
            }
            ApiError::Upstream(upstream) => {
                warn!("Movie catalog request failed: {}", upstream);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("UPSTREAM_ERROR", "Failed to fetch movies"),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", "An internal server error occurred"),
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DatabaseError(_) | ApiError::Upstream(_) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

/// Convert catalog HTTP client errors to ApiError.
/// The URL is stripped because its query carries the TMDB api key.
impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Upstream(error.without_url().to_string())
    }
}

/// User lookups go through the credential store, which speaks AuthError
impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserNotFound => ApiError::NotFound("User not found.".to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}
