// HTTP handlers for authentication endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{
        required, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
        NewPasswordRequest, ResetPasswordRequest, SignupRequest,
    },
    service::{AuthService, ResetLinkStyle},
};
use crate::validation::request_body;

/// Body returned by the protected route
#[derive(Debug, Serialize, ToSchema)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: AuthenticatedUser,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "Missing field or short password", body = MessageResponse),
        (status = 409, description = "Username or email already taken", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn signup_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    let request = request_body(body).map_err(AuthError::InvalidInput)?;
    service
        .signup(
            required(&request.username),
            required(&request.email),
            required(&request.password),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Log in and receive a 7-day session token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing field", body = MessageResponse),
        (status = 401, description = "Invalid password", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let request = request_body(body).map_err(AuthError::InvalidInput)?;
    let token = service
        .login(required(&request.username), required(&request.password))
        .await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// Email a reset link (`?token=` style)
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 400, description = "Missing email", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 500, description = "Mail delivery failed", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn forgot_password_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let request = request_body(body).map_err(AuthError::InvalidInput)?;
    service
        .forgot_password(required(&request.email), ResetLinkStyle::Query)
        .await?;

    Ok(Json(MessageResponse::new("Reset link sent to email")))
}

/// Reset the password with a token carried in the body
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Missing field, short password, or invalid/expired token", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn reset_password_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let request = request_body(body).map_err(AuthError::InvalidInput)?;
    service
        .reset_password(required(&request.token), required(&request.new_password))
        .await?;

    Ok(Json(MessageResponse::new("Password reset successful")))
}

/// Email a reset link (`/reset-password/<token>` style)
#[utoipa::path(
    post,
    path = "/api/password-reset/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 400, description = "Missing email", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "password-reset"
)]
pub async fn request_reset_link_handler(
    State(service): State<Arc<AuthService>>,
    body: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let request = request_body(body).map_err(AuthError::InvalidInput)?;
    service
        .forgot_password(required(&request.email), ResetLinkStyle::Path)
        .await?;

    Ok(Json(MessageResponse::new(
        "Password reset link sent to your email",
    )))
}

/// Reset the password with a token carried in the path
#[utoipa::path(
    post,
    path = "/api/password-reset/reset-password/{token}",
    params(("token" = String, Path, description = "Reset token from the emailed link")),
    request_body = NewPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Missing password or invalid/expired token", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    tag = "password-reset"
)]
pub async fn reset_password_with_path_token_handler(
    State(service): State<Arc<AuthService>>,
    Path(token): Path<String>,
    body: Result<Json<NewPasswordRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
    let request = request_body(body).map_err(AuthError::InvalidInput)?;
    service
        .reset_password(Some(token.as_str()), required(&request.new_password))
        .await?;

    Ok(Json(MessageResponse::new("Password reset successful")))
}

/// Example protected endpoint echoing the caller's session claims
#[utoipa::path(
    get,
    path = "/api/auth/protected",
    responses(
        (status = 200, description = "Caller is authenticated", body = ProtectedResponse),
        (status = 401, description = "No token provided", body = MessageResponse),
        (status = 403, description = "Malformed, invalid or expired token", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn protected_handler(user: AuthenticatedUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "You have accessed a protected route".to_string(),
        user,
    })
}
