// JWT token generation and validation service

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::auth::error::AuthError;

/// Lifetime of a session token
pub const SESSION_TOKEN_TTL_DAYS: i64 = 7;

/// What a token may be used for.
/// Stops a session token from being accepted as a reset token and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordReset,
}

/// Claims payload that can be carried by a signed token
pub trait TokenClaims: Serialize + DeserializeOwned {
    const PURPOSE: TokenPurpose;
}

/// Claims of a login session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub username: String,
}

impl TokenClaims for SessionClaims {
    const PURPOSE: TokenPurpose = TokenPurpose::Session;
}

/// Claims of a password-reset token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetClaims {
    pub user_id: Uuid,
    /// User's token version when the token was issued
    pub token_version: i32,
}

impl TokenClaims for ResetClaims {
    const PURPOSE: TokenPurpose = TokenPurpose::PasswordReset;
}

/// Claims plus the registered fields added at signing time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedClaims<C> {
    #[serde(flatten)]
    pub claims: C,
    pub purpose: TokenPurpose,
    pub iat: i64,
    pub exp: i64,
}

impl<C> SignedClaims<C> {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// Token service for JWT operations
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a new TokenService with secret key
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against an explicit clock in `verify_at`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign `claims` so that they expire `ttl` from now
    pub fn issue<C: TokenClaims>(&self, claims: C, ttl: Duration) -> Result<String, AuthError> {
        self.issue_at(claims, ttl, Utc::now())
    }

    /// Sign `claims` as if issued at `now`
    pub fn issue_at<C: TokenClaims>(
        &self,
        claims: C,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let iat = now.timestamp();
        let signed = SignedClaims {
            claims,
            purpose: C::PURPOSE,
            iat,
            exp: iat + ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature, purpose and expiry of a token
    pub fn verify<C: TokenClaims>(&self, token: &str) -> Result<SignedClaims<C>, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock.
    /// Every failure collapses into `InvalidToken`.
    pub fn verify_at<C: TokenClaims>(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<SignedClaims<C>, AuthError> {
        let signed = decode::<SignedClaims<C>>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })?;

        if signed.purpose != C::PURPOSE {
            debug!("Token rejected: expected {:?}, got {:?}", C::PURPOSE, signed.purpose);
            return Err(AuthError::InvalidToken);
        }

        if now.timestamp() >= signed.exp {
            debug!("Token rejected: expired at {}", signed.exp);
            return Err(AuthError::InvalidToken);
        }

        Ok(signed)
    }

    /// Issue a 7-day session token for a logged-in user
    pub fn generate_session_token(&self, user_id: Uuid, username: &str) -> Result<String, AuthError> {
        self.issue(
            SessionClaims {
                user_id,
                username: username.to_string(),
            },
            Duration::days(SESSION_TOKEN_TTL_DAYS),
        )
    }
}
