// Ticket service: booking and lookups keyed by username

use std::sync::Arc;

use tracing::{debug, info};
use validator::Validate;

use crate::auth::{User, UserStore};
use crate::error::ApiError;
use crate::tickets::models::{BookTicketRequest, NewTicket, Ticket};
use crate::tickets::repository::TicketStore;
use crate::validation::{
    parse_seats, parse_show_time, required_field, ALL_FIELDS_REQUIRED,
};

/// Books tickets against existing accounts
pub struct TicketService {
    users: Arc<dyn UserStore>,
    tickets: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(users: Arc<dyn UserStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self { users, tickets }
    }

    /// Check and normalise a booking request without touching storage
    pub fn prepare(request: &BookTicketRequest) -> Result<NewTicket, ApiError> {
        let username = required_field(&request.username)?;
        let movie_id = required_field(&request.movie_id)?;
        let theater_id = required_field(&request.theater_id)?;
        let show_time = required_field(&request.show_time)?;
        let seats = request
            .seats
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or_else(|| ApiError::BadRequest(ALL_FIELDS_REQUIRED.to_string()))?;

        let ticket = NewTicket {
            username: username.to_string(),
            movie_id: movie_id.to_string(),
            theater_id: theater_id.to_string(),
            seats: parse_seats(seats)?,
            show_time: parse_show_time(show_time)?,
        };
        ticket.validate()?;

        Ok(ticket)
    }

    /// Book a ticket for an existing user
    pub async fn book(&self, request: &BookTicketRequest) -> Result<Ticket, ApiError> {
        let new_ticket = Self::prepare(request)?;

        if self.users.find_by_username(&new_ticket.username).await?.is_none() {
            return Err(ApiError::NotFound(
                "User not found. Please log in first.".to_string(),
            ));
        }

        let ticket = self.tickets.create(&new_ticket).await?;
        info!(ticket_id = %ticket.id, username = %ticket.username, "Ticket booked");
        Ok(ticket)
    }

    /// Tickets booked by `username`; 404 when the user has none
    pub async fn booked(&self, username: &str) -> Result<Vec<Ticket>, ApiError> {
        self.require_user(username).await?;

        let tickets = self.tickets.list_by_username(username).await?;
        if tickets.is_empty() {
            debug!(username = %username, "No tickets booked");
            return Err(ApiError::NotFound("No tickets found for this user.".to_string()));
        }
        Ok(tickets)
    }

    /// The user record and every ticket they booked, possibly none
    pub async fn profile(&self, username: &str) -> Result<(User, Vec<Ticket>), ApiError> {
        let user = self.require_user(username).await?;
        let tickets = self.tickets.list_by_username(username).await?;
        Ok((user, tickets))
    }

    async fn require_user(&self, username: &str) -> Result<User, ApiError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryUserStore;
    use crate::tickets::repository::MemoryTicketStore;
    use serde_json::json;

    async fn service_with_user(username: &str) -> TicketService {
        let users = Arc::new(MemoryUserStore::new());
        users
            .create(username, &format!("{}@example.com", username), "hash")
            .await
            .unwrap();
        TicketService::new(users, Arc::new(MemoryTicketStore::new()))
    }

    fn request(username: &str) -> BookTicketRequest {
        BookTicketRequest {
            username: Some(username.to_string()),
            movie_id: Some("603692".to_string()),
            theater_id: Some("1".to_string()),
            show_time: Some("2025-01-31T18:30:00Z".to_string()),
            seats: Some(json!(2)),
        }
    }

    #[test]
    fn test_prepare_requires_every_field() {
        let mut missing_movie = request("alice");
        missing_movie.movie_id = None;
        let mut missing_seats = request("alice");
        missing_seats.seats = None;
        let mut null_seats = request("alice");
        null_seats.seats = Some(json!(null));

        for req in [missing_movie, missing_seats, null_seats] {
            match TicketService::prepare(&req) {
                Err(ApiError::BadRequest(msg)) => assert_eq!(msg, ALL_FIELDS_REQUIRED),
                other => panic!("unexpected: {:?}", other.map(|t| t.seats)),
            }
        }
    }

    #[test]
    fn test_prepare_rejects_string_seats() {
        let mut req = request("alice");
        req.seats = Some(json!("2"));
        assert!(matches!(TicketService::prepare(&req), Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_book_and_list() {
        let service = service_with_user("alice").await;
        let ticket = service.book(&request("alice")).await.unwrap();
        assert_eq!(ticket.seats, 2);

        let tickets = service.booked("alice").await.unwrap();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, ticket.id);
    }

    #[tokio::test]
    async fn test_book_for_unknown_user() {
        let service = service_with_user("alice").await;
        match service.book(&request("mallory")).await {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "User not found. Please log in first."),
            other => panic!("unexpected: {:?}", other.map(|t| t.id)),
        }
    }

    #[tokio::test]
    async fn test_booked_without_tickets() {
        let service = service_with_user("alice").await;
        match service.booked("alice").await {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "No tickets found for this user."),
            other => panic!("unexpected: {:?}", other.map(|t| t.len())),
        }
        assert!(matches!(service.booked("bob").await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_profile_allows_empty_ticket_list() {
        let service = service_with_user("alice").await;
        let (user, tickets) = service.profile("alice").await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(tickets.is_empty());
    }
}
