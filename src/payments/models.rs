use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::tickets::{PaymentStatus, Ticket};

/// Payment request as sent by clients
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[schema(example = "alice")]
    pub username: Option<String>,
    /// Id of a ticket returned by the booking endpoint
    pub ticket_id: Option<String>,
    #[schema(example = "card")]
    pub payment_method: Option<String>,
}

/// Payment after presence checks
#[derive(Debug, Clone, Validate)]
pub struct NewPayment {
    pub username: String,
    pub ticket_id: Uuid,
    #[validate(custom = "crate::validation::validate_payment_method")]
    pub payment_method: String,
}

/// Response for a successful payment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub message: String,
    pub transaction_id: Uuid,
    pub payment_status: PaymentStatus,
    pub ticket: Ticket,
}
