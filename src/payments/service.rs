// Dummy payment processing: no money moves, the ticket is just marked paid

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::UserStore;
use crate::error::ApiError;
use crate::payments::models::{NewPayment, PaymentRequest};
use crate::tickets::{PaymentStatus, Ticket, TicketStore};
use crate::validation::{parse_ticket_id, required_field};

/// Settles pending tickets
pub struct PaymentService {
    users: Arc<dyn UserStore>,
    tickets: Arc<dyn TicketStore>,
}

impl PaymentService {
    pub fn new(users: Arc<dyn UserStore>, tickets: Arc<dyn TicketStore>) -> Self {
        Self { users, tickets }
    }

    fn prepare(request: &PaymentRequest) -> Result<NewPayment, ApiError> {
        let username = required_field(&request.username)?;
        let ticket_id = required_field(&request.ticket_id)?;
        let payment_method = required_field(&request.payment_method)?;

        let payment = NewPayment {
            username: username.to_string(),
            ticket_id: parse_ticket_id(ticket_id)?,
            payment_method: payment_method.to_string(),
        };
        payment.validate()?;

        Ok(payment)
    }

    /// Pay for a pending ticket, returning the paid ticket
    pub async fn pay(&self, request: &PaymentRequest) -> Result<Ticket, ApiError> {
        let payment = Self::prepare(request)?;

        if self.users.find_by_username(&payment.username).await?.is_none() {
            return Err(ApiError::NotFound(
                "User not found. Please log in first.".to_string(),
            ));
        }

        let ticket = self
            .tickets
            .find_by_id(payment.ticket_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Ticket not found.".to_string()))?;

        if ticket.payment_status == PaymentStatus::Paid {
            return Err(already_paid(ticket.id));
        }

        let transaction_id = Uuid::new_v4();
        // A concurrent payment can win between the read and this update
        let ticket = self
            .tickets
            .mark_paid(ticket.id, &payment.payment_method, transaction_id)
            .await?
            .ok_or_else(|| already_paid(payment.ticket_id))?;

        info!(
            ticket_id = %ticket.id,
            transaction_id = %transaction_id,
            payment_method = %payment.payment_method,
            "Ticket paid"
        );
        Ok(ticket)
    }
}

fn already_paid(ticket_id: Uuid) -> ApiError {
    warn!(ticket_id = %ticket_id, "Rejected payment for a paid ticket");
    ApiError::BadRequest("This ticket is already paid.".to_string())
}
