//! TMDB API client.

use super::error::ProviderError;
use super::http::{build_client, read_json};
use super::source::{DiscoverQuery, MovieSource};
use super::types::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::config::TmdbConfig;
use std::time::Duration;
use tracing::{debug, info};

/// TMDB API v3 client
pub struct TmdbClient {
    /// HTTP client
    client: Client,
    /// Base URL for TMDB API
    base_url: String,
    /// API key, sent as a query parameter
    api_key: String,
    /// Response language
    language: String,
}

impl TmdbClient {
    /// Create a new TMDB client
    pub fn new(
        base_url: String,
        api_key: String,
        language: String,
        request_timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(request_timeout)?,
            base_url,
            api_key,
            language,
        })
    }

    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.language.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Make a GET request with credentials and language attached
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        // Logged without the query string so the API key stays out of logs
        let url = format!("{}{}", self.base_url, endpoint);

        debug!(url = %url, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", self.language.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                url: url.clone(),
                source: e,
            })?;

        read_json(response, &url).await
    }
}

#[async_trait]
impl MovieSource for TmdbClient {
    async fn movie_genres(&self) -> Result<Vec<TmdbGenre>, ProviderError> {
        info!("Fetching movie genres");
        let response: TmdbGenreList = self.get("/genre/movie/list", &[]).await?;
        Ok(response.genres)
    }

    async fn discover_movies(&self, query: &DiscoverQuery) -> Result<Vec<TmdbMovie>, ProviderError> {
        debug!(page = query.page, sort_by = query.sort_by, "Fetching discover page");
        let response: TmdbDiscoverPage = self.get("/discover/movie", &query.to_params()).await?;
        Ok(response.results)
    }
}
