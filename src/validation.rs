// Validation utilities module
// Request body decoding plus presence and type checks for booking and payment input

use axum::{extract::rejection::JsonRejection, Json};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;
use validator::ValidationError;

use crate::error::ApiError;

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required.";
pub const SEATS_MUST_BE_POSITIVE: &str = "Seats must be a positive integer.";
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";

/// Unwraps a JSON request body.
/// A request without a JSON content type counts as an empty object, so the
/// usual missing-field checks answer it; undecodable JSON is a client error.
pub fn request_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, String> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection.body_text());
            Err(INVALID_REQUEST_BODY.to_string())
        }
    }
}

/// Returns the trimmed value, or a 400 naming no particular field
pub fn required_field(value: &Option<String>) -> Result<&str, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(ALL_FIELDS_REQUIRED.to_string()))
}

/// Seats must be a JSON integer greater than zero that fits in an i32.
/// Numeric strings and fractional numbers are rejected.
pub fn parse_seats(value: &Value) -> Result<i32, ApiError> {
    value
        .as_i64()
        .filter(|n| *n > 0)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ApiError::BadRequest(SEATS_MUST_BE_POSITIVE.to_string()))
}

/// Parses an RFC 3339 show time into UTC
pub fn parse_show_time(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::BadRequest("showTime must be an RFC 3339 timestamp.".to_string())
        })
}

/// Parses a ticket id supplied by a client
pub fn parse_ticket_id(value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value).map_err(|_| ApiError::BadRequest("Invalid ticket id.".to_string()))
}

/// Validates that a payment method is a short label without control characters
pub fn validate_payment_method(method: &str) -> Result<(), ValidationError> {
    if method.is_empty() || method.chars().count() > 32 || method.chars().any(char::is_control) {
        Err(ValidationError::new("invalid_payment_method"))
    } else {
        Ok(())
    }
}
