// TMDB HTTP client

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::catalog::models::{TmdbMovie, TmdbPage};
use crate::error::ApiError;

const TMDB_LANGUAGE: &str = "en-US";
const TMDB_REGION: &str = "IN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of movie listings
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// First page of popular movies
    async fn popular(&self) -> Result<Vec<TmdbMovie>, ApiError>;

    /// Movies tagged with a TMDB genre id
    async fn discover_by_genre(&self, genre_id: u32) -> Result<Vec<TmdbMovie>, ApiError>;

    /// First page of movies now in cinemas
    async fn now_playing(&self) -> Result<Vec<TmdbMovie>, ApiError>;
}

/// reqwest-backed TMDB v3 client
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a new TMDB client
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    async fn fetch(&self, path: &str, extra: &[(&str, String)]) -> Result<Vec<TmdbMovie>, ApiError> {
        debug!(path = %path, "Fetching from TMDB");

        let page: TmdbPage = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", TMDB_LANGUAGE),
                ("region", TMDB_REGION),
            ])
            .query(extra)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        page.results
            .ok_or_else(|| ApiError::Upstream(format!("TMDB {} returned no results field", path)))
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn popular(&self) -> Result<Vec<TmdbMovie>, ApiError> {
        self.fetch("/movie/popular", &[("page", "1".to_string())]).await
    }

    async fn discover_by_genre(&self, genre_id: u32) -> Result<Vec<TmdbMovie>, ApiError> {
        self.fetch("/discover/movie", &[("with_genres", genre_id.to_string())])
            .await
    }

    async fn now_playing(&self) -> Result<Vec<TmdbMovie>, ApiError> {
        self.fetch("/movie/now_playing", &[("page", "1".to_string())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_upstream_is_upstream_error() {
        // Port 9 (discard) on loopback is not expected to speak HTTP
        let client = TmdbClient::new("key", "http://127.0.0.1:9/3").unwrap();
        match client.popular().await {
            Err(ApiError::Upstream(msg)) => assert!(!msg.contains("api_key")),
            other => panic!("unexpected: {:?}", other.map(|m| m.len())),
        }
    }
}
