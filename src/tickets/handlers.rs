// HTTP handlers for ticket endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::error::ApiError;
use crate::validation::request_body;
use crate::tickets::{
    models::{BookTicketRequest, BookTicketResponse, TicketsResponse},
    service::TicketService,
};

/// Book seats for a show
#[utoipa::path(
    post,
    path = "/api/tickets/book",
    request_body = BookTicketRequest,
    responses(
        (status = 201, description = "Ticket booked", body = BookTicketResponse),
        (status = 400, description = "Missing field, bad seats or show time"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "tickets"
)]
pub async fn book_ticket_handler(
    State(service): State<Arc<TicketService>>,
    body: Result<Json<BookTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookTicketResponse>), ApiError> {
    let request = request_body(body).map_err(ApiError::BadRequest)?;
    let ticket = service.book(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(BookTicketResponse {
            message: "Ticket booked successfully!".to_string(),
            ticket,
        }),
    ))
}

/// List the tickets a user has booked
#[utoipa::path(
    get,
    path = "/api/tickets/booked/{username}",
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Booked tickets", body = TicketsResponse),
        (status = 404, description = "User not found or no tickets"),
        (status = 500, description = "Internal server error")
    ),
    tag = "tickets"
)]
pub async fn booked_tickets_handler(
    State(service): State<Arc<TicketService>>,
    Path(username): Path<String>,
) -> Result<Json<TicketsResponse>, ApiError> {
    let tickets = service.booked(&username).await?;
    Ok(Json(TicketsResponse { tickets }))
}
