// Catalog service: shapes TMDB listings for the frontend

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::catalog::client::MovieSource;
use crate::catalog::models::{find_theater, theaters, Genre, Theater, TmdbMovie, TopPick};
use crate::error::ApiError;

pub const TOP_PICKS_LIMIT: usize = 10;
pub const GENRE_LIMIT: usize = 5;
pub const THEATER_LIMIT: usize = 6;

/// The first `TOP_PICKS_LIMIT` movies as top-pick cards
pub fn top_picks_from(movies: &[TmdbMovie]) -> Vec<TopPick> {
    movies.iter().take(TOP_PICKS_LIMIT).map(TopPick::from).collect()
}

/// Keep supported-language movies in upstream order, at most `limit`
pub fn filter_supported(movies: Vec<TmdbMovie>, limit: usize) -> Vec<TmdbMovie> {
    movies
        .into_iter()
        .filter(TmdbMovie::in_supported_language)
        .take(limit)
        .collect()
}

/// Random sample of up to `limit` supported-language movies
pub fn sample_supported<R: Rng + ?Sized>(
    movies: Vec<TmdbMovie>,
    limit: usize,
    rng: &mut R,
) -> Vec<TmdbMovie> {
    let mut movies = filter_supported(movies, usize::MAX);
    movies.shuffle(rng);
    movies.truncate(limit);
    movies
}

pub struct CatalogService {
    source: Arc<dyn MovieSource>,
}

impl CatalogService {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self { source }
    }

    pub async fn top_picks(&self) -> Result<Vec<TopPick>, ApiError> {
        let movies = self.source.popular().await?;
        Ok(top_picks_from(&movies))
    }

    pub async fn by_genre(&self, slug: &str) -> Result<Vec<TmdbMovie>, ApiError> {
        let genre = Genre::from_slug(slug)
            .ok_or_else(|| ApiError::BadRequest("Invalid genre".to_string()))?;

        let movies = filter_supported(
            self.source.discover_by_genre(genre.tmdb_id()).await?,
            GENRE_LIMIT,
        );
        if movies.is_empty() {
            return Err(ApiError::NotFound(format!(
                "No movies found for {} genre.",
                genre.slug()
            )));
        }
        Ok(movies)
    }

    pub fn theaters(&self) -> Vec<Theater> {
        theaters()
    }

    pub async fn theater_movies(&self, theater_id: &str) -> Result<Vec<TmdbMovie>, ApiError> {
        let theater = find_theater(theater_id)
            .ok_or_else(|| ApiError::NotFound("Theater not found.".to_string()))?;

        let playing = self.source.now_playing().await?;
        let movies = sample_supported(playing, THEATER_LIMIT, &mut rand::thread_rng());
        if movies.is_empty() {
            return Err(ApiError::NotFound("No movies currently playing.".to_string()));
        }

        debug!(theater = %theater.name, count = movies.len(), "Theater listing built");
        Ok(movies)
    }
}
