//! Jikan API client with single-retry rate limit handling.

use super::error::ProviderError;
use super::http::{build_client, read_json};
use super::source::{AnimeQuery, AnimeSource};
use super::types::*;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::config::JikanConfig;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Jikan API v4 client
pub struct JikanClient {
    /// HTTP client
    client: Client,
    /// Base URL for Jikan API
    base_url: String,
    /// Pause before retrying a rate-limited request
    retry_delay: Duration,
}

impl JikanClient {
    /// Create a new Jikan client
    pub fn new(base_url: String, request_timeout: Duration, retry_delay: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(request_timeout)?,
            base_url,
            retry_delay,
        })
    }

    pub fn from_config(config: &JikanConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_millis(config.rate_limit_retry_delay_ms),
        )
    }

    /// Make a GET request, retrying up to `rate_limit_retries` times on HTTP 429
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        rate_limit_retries: u32,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, endpoint);

        for attempt in 0..=rate_limit_retries {
            debug!(url = %url, attempt = attempt + 1, "Making API request");

            let response = self
                .client
                .get(&url)
                .query(params)
                .send()
                .await
                .map_err(|e| {
                    warn!(url = %url, error = %e, "Request error");
                    ProviderError::Transport {
                        url: url.clone(),
                        source: e,
                    }
                })?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if attempt < rate_limit_retries {
                    warn!(
                        url = %url,
                        delay_ms = self.retry_delay.as_millis(),
                        "Rate limited by server, waiting"
                    );
                    sleep(self.retry_delay).await;
                    continue;
                }
                warn!(url = %url, "Still rate limited, giving up");
                return Err(ProviderError::RateLimited { url });
            }

            return read_json(response, &url).await;
        }

        Err(ProviderError::RateLimited { url })
    }
}

#[async_trait]
impl AnimeSource for JikanClient {
    async fn anime_genres(&self) -> Result<Vec<CategoryItem>, ProviderError> {
        info!("Fetching anime genres");
        let response: DataResponse<CategoryItem> = self.get("/genres/anime", &[], 0).await?;
        Ok(response.data)
    }

    async fn search_anime(&self, query: &AnimeQuery) -> Result<Vec<JikanAnime>, ProviderError> {
        debug!(page = query.page, "Fetching anime page");
        let response: DataResponse<JikanAnime> = self.get("/anime", &query.to_params(), 1).await?;
        Ok(response.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;
    use axum::http::StatusCode as HttpStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn client(base_url: String) -> JikanClient {
        JikanClient::new(base_url, Duration::from_secs(5), Duration::from_millis(10)).unwrap()
    }

    fn first_page() -> AnimeQuery {
        AnimeQuery {
            start_date: None,
            end_date: None,
            page: 1,
        }
    }

    /// Serves `/anime`, answering 429 for the first `throttled` requests
    fn throttling_app(throttled: usize, hits: Arc<AtomicUsize>) -> Router {
        Router::new().route(
            "/anime",
            get(move || {
                let hits = hits.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    if n < throttled {
                        return HttpStatus::TOO_MANY_REQUESTS.into_response();
                    }
                    let body = serde_json::json!({
                        "data": [
                            { "mal_id": 1, "title": "Alpha", "genres": [] },
                            { "mal_id": 2, "title": "Beta", "genres": [] }
                        ]
                    });
                    axum::Json(body).into_response()
                }
            }),
        )
    }

    #[test]
    fn test_client_creation() {
        let client = JikanClient::from_config(&JikanConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_retries_once_after_rate_limit() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base_url = serve(throttling_app(1, hits.clone())).await;

        let anime = client(base_url).search_anime(&first_page()).await.unwrap();

        assert_eq!(anime.len(), 2);
        assert_eq!(anime[0].title, "Alpha");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_rate_limit_fails() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base_url = serve(throttling_app(usize::MAX, hits.clone())).await;

        let err = client(base_url).search_anime(&first_page()).await.unwrap_err();

        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert!(err.is_transport());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_genres_are_not_retried() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/genres/anime",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response: Response = HttpStatus::TOO_MANY_REQUESTS.into_response();
                    response
                }
            }),
        );
        let base_url = serve(app).await;

        let err = client(base_url).anime_genres().await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_genres_parse() {
        let app = Router::new().route(
            "/genres/anime",
            get(|| async {
                axum::Json(serde_json::json!({
                    "data": [
                        { "mal_id": 1, "name": "Action", "url": "x", "count": 5000 },
                        { "mal_id": 2, "name": "Adventure", "url": "y", "count": 4000 }
                    ]
                }))
            }),
        );
        let base_url = serve(app).await;

        let genres = client(base_url).anime_genres().await.unwrap();
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Adventure"]);
    }
}
