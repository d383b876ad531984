// Profile endpoint: account details plus booking history

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::UserResponse;
use crate::error::ApiError;
use crate::tickets::{Ticket, TicketService};

/// Profile payload; never carries the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub message: String,
    pub user: UserResponse,
    pub tickets: Vec<Ticket>,
}

/// Fetch a user's profile and tickets
#[utoipa::path(
    get,
    path = "/api/profile/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Profile fetched", body = ProfileResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "profile"
)]
pub async fn profile_handler(
    State(service): State<Arc<TicketService>>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let (user, tickets) = service.profile(&username).await?;

    Ok(Json(ProfileResponse {
        message: "Profile fetched successfully!".to_string(),
        user: user.into(),
        tickets,
    }))
}
