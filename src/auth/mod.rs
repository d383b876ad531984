// Authentication module
// Signup, login, password reset and the bearer-token guard for protected routes

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    forgot_password_handler, login_handler, protected_handler, request_reset_link_handler,
    reset_password_handler, reset_password_with_path_token_handler, signup_handler,
};
pub use middleware::AuthenticatedUser;
pub use models::{User, UserResponse};
pub use repository::{MemoryUserStore, PgUserStore, UserStore};
pub use service::AuthService;
