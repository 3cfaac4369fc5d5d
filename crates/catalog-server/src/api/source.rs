//! Provider seams.
//!
//! The fetch pipeline only sees these traits: "fetch genres" and "fetch one
//! page of items for a query". The HTTP clients implement them, tests plug in
//! in-process fakes.

use super::error::ProviderError;
use super::types::{CategoryItem, JikanAnime, TmdbGenre, TmdbMovie};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Movie metadata provider
#[async_trait]
pub trait MovieSource: Send + Sync {
    /// Full movie genre list, in provider order
    async fn movie_genres(&self) -> Result<Vec<TmdbGenre>, ProviderError>;

    /// One page of discover results
    async fn discover_movies(&self, query: &DiscoverQuery) -> Result<Vec<TmdbMovie>, ProviderError>;
}

/// Anime metadata provider
#[async_trait]
pub trait AnimeSource: Send + Sync {
    /// Full anime genre list, in provider order
    async fn anime_genres(&self) -> Result<Vec<CategoryItem>, ProviderError>;

    /// One page of anime search results
    async fn search_anime(&self, query: &AnimeQuery) -> Result<Vec<JikanAnime>, ProviderError>;
}

/// Query for one page of `GET /discover/movie`
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoverQuery {
    pub sort_by: &'static str,
    pub min_vote_count: u32,
    pub min_vote_average: Option<f64>,
    pub min_runtime: u32,
    pub release_date_gte: Option<NaiveDate>,
    pub release_date_lte: NaiveDate,
    pub page: u32,
}

impl DiscoverQuery {
    /// Query string pairs, without credentials or language
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", self.sort_by.to_string()),
            ("primary_release_date.lte", self.release_date_lte.to_string()),
            ("with_runtime.gte", self.min_runtime.to_string()),
            ("vote_count.gte", self.min_vote_count.to_string()),
            ("page", self.page.to_string()),
        ];

        if let Some(average) = self.min_vote_average {
            params.push(("vote_average.gte", average.to_string()));
        }
        if let Some(start) = self.release_date_gte {
            params.push(("primary_release_date.gte", start.to_string()));
        }

        params
    }
}

/// Query for one page of `GET /anime`
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u32,
}

impl AnimeQuery {
    /// Fixed upstream page size
    pub const PAGE_SIZE: u32 = 25;

    /// Minimum MAL score for the master list
    pub const MIN_SCORE: f64 = 6.5;

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("order_by", "score".to_string()),
            ("sort", "desc".to_string()),
            ("min_score", Self::MIN_SCORE.to_string()),
            ("limit", Self::PAGE_SIZE.to_string()),
            ("page", self.page.to_string()),
            ("type", "tv".to_string()),
        ];

        if let Some(start) = self.start_date {
            params.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.to_string()));
        }

        params
    }
}
