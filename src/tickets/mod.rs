// Ticket module
// Seat bookings for a movie show, stored per username

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use handlers::{book_ticket_handler, booked_tickets_handler};
pub use models::{BookTicketRequest, BookTicketResponse, PaymentStatus, Ticket, TicketsResponse};
pub use repository::{MemoryTicketStore, PgTicketStore, TicketStore};
pub use service::TicketService;
