use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Payment state of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    /// Convert payment status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booked ticket
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    #[schema(example = "alice")]
    pub username: String,
    /// TMDB movie id
    #[schema(example = "603692")]
    pub movie_id: String,
    #[schema(example = "1")]
    pub theater_id: String,
    #[schema(example = 2, minimum = 1)]
    pub seats: i32,
    pub show_time: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Booking request as sent by clients
///
/// Every field is optional at the wire level so that missing fields produce a
/// 400 with a readable message rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookTicketRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[schema(example = "603692")]
    pub movie_id: Option<String>,
    #[schema(example = "1")]
    pub theater_id: Option<String>,
    /// RFC 3339 timestamp
    #[schema(example = "2025-01-31T18:30:00Z")]
    pub show_time: Option<String>,
    /// Must be a JSON integer greater than zero
    #[schema(value_type = Option<i64>, example = 2)]
    pub seats: Option<serde_json::Value>,
}

/// Booking after presence and type checks
#[derive(Debug, Clone, Validate)]
pub struct NewTicket {
    #[validate(length(min = 1, max = 64, message = "username must be 1-64 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 32, message = "movieId must be 1-32 characters"))]
    pub movie_id: String,
    #[validate(length(min = 1, max = 32, message = "theaterId must be 1-32 characters"))]
    pub theater_id: String,
    pub show_time: DateTime<Utc>,
    #[validate(range(min = 1, message = "seats must be a positive integer"))]
    pub seats: i32,
}

/// Response for a successful booking
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookTicketResponse {
    pub message: String,
    pub ticket: Ticket,
}

/// Response listing a user's tickets
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketsResponse {
    pub tickets: Vec<Ticket>,
}
