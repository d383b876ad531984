// Authentication guard for protected routes

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{error::AuthError, service::AuthService};

/// Authenticated user extractor for protected routes
///
/// Holds the decoded session claims; handlers that take it as an argument
/// only run for requests carrying a valid `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Pull the token out of an `Authorization` header value.
/// Only the scheme-separated second segment counts.
fn bearer_token(value: &str) -> Result<&str, AuthError> {
    let mut segments = value.split(' ');
    match (segments.next(), segments.next()) {
        (Some("Bearer"), Some(token)) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedToken),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AuthService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let endpoint = parts.uri.path().to_string();

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| {
                warn!("Missing Authorization header for endpoint: {}", endpoint);
                AuthError::MissingToken
            })?
            .to_str()
            .map_err(|_| AuthError::MalformedToken)?;

        let token = bearer_token(auth_header)?;

        let auth = Arc::<AuthService>::from_ref(state);
        let signed = auth.authenticate(token)?;

        debug!(
            "Authenticated user_id={} for endpoint: {}",
            signed.claims.user_id, endpoint
        );

        Ok(AuthenticatedUser {
            issued_at: signed.issued_at(),
            expires_at: signed.expires_at(),
            user_id: signed.claims.user_id,
            username: signed.claims.username,
        })
    }
}
