// HTTP handlers for the movie catalog

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::catalog::{
    models::{Theater, TmdbMovie, TopPick},
    service::CatalogService,
};
use crate::error::ApiError;

/// Popular movies in India as compact cards
#[utoipa::path(
    get,
    path = "/api/movies/top-picks",
    responses(
        (status = 200, description = "Up to 10 top picks", body = [TopPick]),
        (status = 500, description = "TMDB unavailable")
    ),
    tag = "movies"
)]
pub async fn top_picks_handler(
    State(catalog): State<Arc<CatalogService>>,
) -> Result<Json<Vec<TopPick>>, ApiError> {
    Ok(Json(catalog.top_picks().await?))
}

/// Movies for one of the supported genres
#[utoipa::path(
    get,
    path = "/api/movies/genre/{genre}",
    params(("genre" = String, Path, description = "sciFi, supernatural, horror, comedy or animation")),
    responses(
        (status = 200, description = "Up to 5 movies", body = [TmdbMovie]),
        (status = 400, description = "Unknown genre"),
        (status = 404, description = "No movies in a supported language"),
        (status = 500, description = "TMDB unavailable")
    ),
    tag = "movies"
)]
pub async fn genre_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(genre): Path<String>,
) -> Result<Json<Vec<TmdbMovie>>, ApiError> {
    Ok(Json(catalog.by_genre(&genre).await?))
}

/// Partner theaters
#[utoipa::path(
    get,
    path = "/api/movies/theaters",
    responses((status = 200, description = "All theaters", body = [Theater])),
    tag = "movies"
)]
pub async fn theaters_handler(State(catalog): State<Arc<CatalogService>>) -> Json<Vec<Theater>> {
    Json(catalog.theaters())
}

/// A random selection of what a theater is showing
#[utoipa::path(
    get,
    path = "/api/movies/theaters/{theater_id}/movies",
    params(("theater_id" = String, Path, description = "Theater id, 1 to 10")),
    responses(
        (status = 200, description = "Up to 6 movies", body = [TmdbMovie]),
        (status = 404, description = "Unknown theater or nothing playing"),
        (status = 500, description = "TMDB unavailable")
    ),
    tag = "movies"
)]
pub async fn theater_movies_handler(
    State(catalog): State<Arc<CatalogService>>,
    Path(theater_id): Path<String>,
) -> Result<Json<Vec<TmdbMovie>>, ApiError> {
    Ok(Json(catalog.theater_movies(&theater_id).await?))
}
