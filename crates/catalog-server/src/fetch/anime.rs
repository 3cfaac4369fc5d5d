//! Anime master list fetcher (Jikan search).

use super::{collect_pages, FetchOutcome, PageLimits};
use crate::api::{AnimeQuery, AnimeSource, JikanAnime, ProviderError};
use chrono::NaiveDate;
use shared::config::JikanConfig;
use shared::{MediaRecord, UNKNOWN_RELEASE_DATE};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct AnimeFetchParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct AnimeFetchSettings {
    pub max_pages: u32,
    /// Pause between page requests, Jikan throttles bursts
    pub page_delay: Duration,
}

impl Default for AnimeFetchSettings {
    fn default() -> Self {
        Self::from_config(&JikanConfig::default())
    }
}

impl AnimeFetchSettings {
    pub fn from_config(config: &JikanConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Normalize one search result
pub fn normalize_anime(anime: JikanAnime) -> MediaRecord {
    let jpg = anime.images.and_then(|images| images.jpg);
    let poster_url = jpg.and_then(|jpg| non_empty(jpg.large_image_url).or(non_empty(jpg.image_url)));

    let release_date = anime
        .aired
        .and_then(|aired| non_empty(aired.from))
        .and_then(|from| from.split('T').next().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string());

    MediaRecord {
        id: anime.mal_id,
        title: non_empty(anime.title_english).unwrap_or(anime.title),
        release_date,
        rating: anime.score,
        votes: anime.scored_by,
        genre_ids: None,
        genres: anime.genres.into_iter().map(|g| g.name).collect(),
        poster_url,
    }
}

/// Fetch up to `params.limit` TV anime with a score of at least 6.5
pub async fn fetch_anime(
    source: &dyn AnimeSource,
    params: &AnimeFetchParams,
    settings: &AnimeFetchSettings,
) -> Result<FetchOutcome, ProviderError> {
    info!(
        start_date = ?params.start_date,
        end_date = ?params.end_date,
        limit = params.limit,
        "Fetching anime master list"
    );

    let limits = PageLimits {
        limit: params.limit,
        max_pages: settings.max_pages,
        page_delay: settings.page_delay,
    };

    collect_pages(
        "jikan",
        limits,
        |page| {
            let query = AnimeQuery {
                start_date: params.start_date,
                end_date: params.end_date,
                page,
            };
            async move { source.search_anime(&query).await }
        },
        normalize_anime,
    )
    .await
}
