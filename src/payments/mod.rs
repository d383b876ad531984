// Payment module
// Simulated checkout for booked tickets

pub mod handlers;
pub mod models;
pub mod service;

pub use handlers::pay_handler;
pub use models::{PaymentRequest, PaymentResponse};
pub use service::PaymentService;
