// Movie catalog module
// TMDB-backed listings and the static theater list

pub mod client;
pub mod handlers;
pub mod models;
pub mod service;

pub use client::{MovieSource, TmdbClient};
pub use handlers::{genre_handler, theater_movies_handler, theaters_handler, top_picks_handler};
pub use models::{Theater, TmdbMovie, TopPick};
pub use service::CatalogService;
