// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error, warn};

/// Authentication error types
///
/// Client-facing messages are fixed strings; the `String` payloads on the
/// 500-class variants are only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username or email already taken")]
    Conflict,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Malformed authorization header")]
    MalformedToken,

    /// Session token rejected by the protected-route guard
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Reset token rejected by the reset-password flow
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Password hashing error")]
    PasswordHash,

    #[error("Token generation error: {0}")]
    TokenGeneration(String),

    #[error("Mail delivery error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Database(err.to_string())
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput(_) | AuthError::InvalidResetToken => StatusCode::BAD_REQUEST,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidCredentials | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::MalformedToken | AuthError::InvalidToken => StatusCode::FORBIDDEN,
            AuthError::Database(_)
            | AuthError::PasswordHash
            | AuthError::TokenGeneration(_)
            | AuthError::Mail(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to clients
    pub fn error_message(&self) -> String {
        match self {
            AuthError::InvalidInput(msg) => msg.clone(),
            AuthError::Conflict => "Username or email already taken".to_string(),
            AuthError::UserNotFound => "User not found".to_string(),
            AuthError::InvalidCredentials => "Invalid password".to_string(),
            AuthError::MissingToken => "Access Denied. No Token Provided".to_string(),
            AuthError::MalformedToken => "Invalid Token Format".to_string(),
            AuthError::InvalidToken => "Invalid or Expired Token".to_string(),
            AuthError::InvalidResetToken => "Invalid or expired token".to_string(),
            AuthError::Database(_)
            | AuthError::PasswordHash
            | AuthError::TokenGeneration(_)
            | AuthError::Mail(_)
            | AuthError::Internal(_) => "Internal Server Error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Auth request failed: {}", self);
        } else if matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::MalformedToken
                | AuthError::InvalidToken
                | AuthError::InvalidResetToken
        ) {
            warn!("Rejected auth attempt: {}", self);
        } else {
            debug!("Auth request rejected: {}", self);
        }

        let body = Json(json!({
            "message": self.error_message(),
        }));

        (status, body).into_response()
    }
}
