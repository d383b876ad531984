use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tickets::models::{NewTicket, PaymentStatus, Ticket};

/// Storage backend for tickets
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, ApiError>;

    /// All tickets booked under `username`, oldest first
    async fn list_by_username(&self, username: &str) -> Result<Vec<Ticket>, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError>;

    /// Move a pending ticket to paid, stamping the transaction.
    /// Returns `None` when no pending ticket with that id exists.
    async fn mark_paid(
        &self,
        id: Uuid,
        payment_method: &str,
        transaction_id: Uuid,
    ) -> Result<Option<Ticket>, ApiError>;
}

const TICKET_COLUMNS: &str = "id, username, movie_id, theater_id, seats, show_time, \
     payment_status, transaction_id, payment_method, created_at";

/// PostgreSQL-backed ticket store
#[derive(Clone)]
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    /// Create a new PgTicketStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, ApiError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            INSERT INTO tickets (id, username, movie_id, theater_id, seats, show_time, payment_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&ticket.username)
        .bind(&ticket.movie_id)
        .bind(&ticket.theater_id)
        .bind(ticket.seats)
        .bind(ticket.show_time)
        .bind(PaymentStatus::Pending)
        .fetch_one(&self.pool)
        .await?;

        Ok(ticket)
    }

    async fn list_by_username(&self, username: &str) -> Result<Vec<Ticket>, ApiError> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE username = $1 ORDER BY created_at",
            TICKET_COLUMNS
        ))
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {} FROM tickets WHERE id = $1",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        payment_method: &str,
        transaction_id: Uuid,
    ) -> Result<Option<Ticket>, ApiError> {
        // Conditional on the current status so two payments cannot both succeed
        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            r#"
            UPDATE tickets
            SET payment_status = $2, transaction_id = $3, payment_method = $4
            WHERE id = $1 AND payment_status = $5
            RETURNING {}
            "#,
            TICKET_COLUMNS
        ))
        .bind(id)
        .bind(PaymentStatus::Paid)
        .bind(transaction_id)
        .bind(payment_method)
        .bind(PaymentStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }
}

/// In-memory ticket store
#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: Mutex<Vec<Ticket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketStore for MemoryTicketStore {
    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, ApiError> {
        let ticket = Ticket {
            id: Uuid::new_v4(),
            username: ticket.username.clone(),
            movie_id: ticket.movie_id.clone(),
            theater_id: ticket.theater_id.clone(),
            seats: ticket.seats,
            show_time: ticket.show_time,
            payment_status: PaymentStatus::Pending,
            transaction_id: None,
            payment_method: None,
            created_at: Utc::now(),
        };
        self.tickets.lock().await.push(ticket.clone());
        Ok(ticket)
    }

    async fn list_by_username(&self, username: &str) -> Result<Vec<Ticket>, ApiError> {
        let tickets = self.tickets.lock().await;
        Ok(tickets
            .iter()
            .filter(|t| t.username == username)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError> {
        let tickets = self.tickets.lock().await;
        Ok(tickets.iter().find(|t| t.id == id).cloned())
    }

    async fn mark_paid(
        &self,
        id: Uuid,
        payment_method: &str,
        transaction_id: Uuid,
    ) -> Result<Option<Ticket>, ApiError> {
        let mut tickets = self.tickets.lock().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id && t.payment_status == PaymentStatus::Pending);

        Ok(ticket.map(|ticket| {
            ticket.payment_status = PaymentStatus::Paid;
            ticket.transaction_id = Some(transaction_id);
            ticket.payment_method = Some(payment_method.to_string());
            ticket.clone()
        }))
    }
}
