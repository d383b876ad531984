// Filmatik API
// Router, shared state and startup wiring for the movie ticket backend

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod payments;
pub mod profile;
pub mod tickets;
pub mod validation;

use std::{any::Any as PanicPayload, sync::Arc};

use axum::{
    extract::FromRef,
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Router,
};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    password::PasswordService, token::TokenService, AuthError, AuthService, MemoryUserStore,
    PgUserStore, UserStore,
};
use catalog::{CatalogService, MovieSource, TmdbClient};
use config::{AppConfig, StorageBackend};
use mail::{LogMailer, MailError, Mailer, SmtpMailer};
use payments::PaymentService;
use tickets::{MemoryTicketStore, PgTicketStore, TicketService, TicketStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::login_handler,
        auth::handlers::forgot_password_handler,
        auth::handlers::reset_password_handler,
        auth::handlers::protected_handler,
        auth::handlers::request_reset_link_handler,
        auth::handlers::reset_password_with_path_token_handler,
        tickets::handlers::book_ticket_handler,
        tickets::handlers::booked_tickets_handler,
        payments::handlers::pay_handler,
        profile::profile_handler,
        catalog::handlers::top_picks_handler,
        catalog::handlers::genre_handler,
        catalog::handlers::theaters_handler,
        catalog::handlers::theater_movies_handler,
    ),
    components(schemas(
        auth::models::SignupRequest,
        auth::models::LoginRequest,
        auth::models::LoginResponse,
        auth::models::ForgotPasswordRequest,
        auth::models::ResetPasswordRequest,
        auth::models::NewPasswordRequest,
        auth::models::MessageResponse,
        auth::UserResponse,
        auth::AuthenticatedUser,
        auth::handlers::ProtectedResponse,
        tickets::Ticket,
        tickets::PaymentStatus,
        tickets::BookTicketRequest,
        tickets::BookTicketResponse,
        tickets::TicketsResponse,
        payments::PaymentRequest,
        payments::PaymentResponse,
        profile::ProfileResponse,
        catalog::TopPick,
        catalog::TmdbMovie,
        catalog::Theater,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login and password reset"),
        (name = "tickets", description = "Seat booking"),
        (name = "payments", description = "Simulated checkout"),
        (name = "profile", description = "Account overview"),
        (name = "movies", description = "TMDB-backed catalog and theaters")
    ),
    info(
        title = "Filmatik API",
        version = "0.1.0",
        description = "Backend for browsing movies and booking tickets"
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme used by the protected route
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tickets: Arc<TicketService>,
    pub payments: Arc<PaymentService>,
    pub catalog: Arc<CatalogService>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for Arc<TicketService> {
    fn from_ref(state: &AppState) -> Self {
        state.tickets.clone()
    }
}

impl FromRef<AppState> for Arc<PaymentService> {
    fn from_ref(state: &AppState) -> Self {
        state.payments.clone()
    }
}

impl FromRef<AppState> for Arc<CatalogService> {
    fn from_ref(state: &AppState) -> Self {
        state.catalog.clone()
    }
}

impl AppState {
    /// Wire services over already-constructed backends
    pub fn new(
        config: &AppConfig,
        users: Arc<dyn UserStore>,
        tickets: Arc<dyn TicketStore>,
        mailer: Arc<dyn Mailer>,
        movies: Arc<dyn MovieSource>,
    ) -> Result<Self, AuthError> {
        let auth = AuthService::new(
            users.clone(),
            PasswordService::new(config.hash_cost)?,
            Arc::new(TokenService::new(&config.jwt_secret)),
            mailer,
            config.frontend_url.clone(),
            chrono::Duration::minutes(config.reset_token_ttl_minutes),
        );

        Ok(Self {
            auth: Arc::new(auth),
            tickets: Arc::new(TicketService::new(users.clone(), tickets.clone())),
            payments: Arc::new(PaymentService::new(users, tickets)),
            catalog: Arc::new(CatalogService::new(movies)),
        })
    }
}

/// Anything that can stop the server from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("auth setup error: {0}")]
    Auth(#[from] AuthError),

    #[error("mail setup error: {0}")]
    Mail(#[from] MailError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect the configured backends and build the shared state
pub async fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let (users, tickets): (Arc<dyn UserStore>, Arc<dyn TicketStore>) = match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(config::ConfigError::Missing("DATABASE_URL"))?;
            let pool = db::create_pool(database_url).await?;
            db::run_migrations(&pool).await?;
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgTicketStore::new(pool)),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            (
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemoryTicketStore::new()),
            )
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
        None => {
            tracing::warn!("EMAIL_USER/EMAIL_PASS not set; reset emails will only be logged");
            Arc::new(LogMailer)
        }
    };

    let movies = Arc::new(TmdbClient::new(
        config.tmdb_api_key.clone(),
        config.tmdb_base_url.clone(),
    )?);

    Ok(AppState::new(config, users, tickets, mailer, movies)?)
}

/// Turns a handler panic into the usual 500 JSON body
pub(crate) fn panic_response(panic: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AuthError::Internal(format!("handler panicked: {}", detail)).into_response()
}

async fn root_handler() -> &'static str {
    "Filmatik Backend Server is Running!"
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS, tracing and panic layers
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup_handler))
        .route("/login", post(auth::login_handler))
        .route("/forgot-password", post(auth::forgot_password_handler))
        .route("/reset-password", post(auth::reset_password_handler))
        .route("/protected", get(auth::protected_handler));

    let password_reset_routes = Router::new()
        .route("/forgot-password", post(auth::request_reset_link_handler))
        .route(
            "/reset-password/:token",
            post(auth::reset_password_with_path_token_handler),
        );

    let movie_routes = Router::new()
        .route("/top-picks", get(catalog::top_picks_handler))
        .route("/genre/:genre", get(catalog::genre_handler))
        .route("/theaters", get(catalog::theaters_handler))
        .route(
            "/theaters/:theater_id/movies",
            get(catalog::theater_movies_handler),
        );

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root_handler))
        .nest("/api/auth", auth_routes)
        .nest("/api/password-reset", password_reset_routes)
        .route("/api/tickets/book", post(tickets::book_ticket_handler))
        .route(
            "/api/tickets/booked/:username",
            get(tickets::booked_tickets_handler),
        )
        .route("/api/payments/pay", post(payments::pay_handler))
        .route("/api/profile/:username", get(profile::profile_handler))
        .nest("/api/movies", movie_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
