// HTTP handler for the dummy payment endpoint

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::ApiError;
use crate::validation::request_body;
use crate::payments::{
    models::{PaymentRequest, PaymentResponse},
    service::PaymentService,
};

/// Pay for a booked ticket
#[utoipa::path(
    post,
    path = "/api/payments/pay",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment successful", body = PaymentResponse),
        (status = 400, description = "Missing field, malformed ticket id or already paid"),
        (status = 404, description = "User or ticket not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "payments"
)]
pub async fn pay_handler(
    State(service): State<Arc<PaymentService>>,
    body: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let request = request_body(body).map_err(ApiError::BadRequest)?;
    let ticket = service.pay(&request).await?;

    Ok(Json(PaymentResponse {
        message: "Payment successful!".to_string(),
        transaction_id: ticket.transaction_id.ok_or_else(|| {
            ApiError::InternalError("paid ticket without a transaction id".to_string())
        })?,
        payment_status: ticket.payment_status,
        ticket,
    }))
}
