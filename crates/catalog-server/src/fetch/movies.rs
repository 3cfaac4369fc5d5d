//! Movie master list fetcher (TMDB discover).

use super::{collect_pages, FetchOutcome, PageLimits};
use crate::api::{DiscoverQuery, MovieSource, ProviderError, TmdbMovie};
use crate::genres::MovieGenreMap;
use chrono::{Local, NaiveDate};
use shared::config::TmdbConfig;
use shared::{MediaRecord, SortMode, UNKNOWN_RELEASE_DATE};
use std::time::Duration;
use tracing::info;

/// Minimum runtime in minutes, drops shorts
const MIN_RUNTIME: u32 = 60;

/// Genres dropped from a movie that also has any other genre
const NOISE_GENRES: [&str; 2] = ["romance", "music"];

/// What to fetch
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFetchParams {
    pub sort: SortMode,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: usize,
}

/// How to fetch
#[derive(Debug, Clone)]
pub struct MovieFetchSettings {
    pub max_pages: u32,
    pub image_base_url: String,
}

impl Default for MovieFetchSettings {
    fn default() -> Self {
        Self::from_config(&TmdbConfig::default())
    }
}

impl MovieFetchSettings {
    pub fn from_config(config: &TmdbConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            image_base_url: config.image_base_url.clone(),
        }
    }
}

/// Build the first-page discover query for a sort mode and date range
///
/// The upper release bound is `today`, or `end_date` when that is earlier.
pub fn discover_query(
    sort: SortMode,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> DiscoverQuery {
    let (sort_by, min_vote_count, min_vote_average) = match sort {
        SortMode::Popular => ("vote_average.desc", 500, Some(6.5)),
        SortMode::Latest => ("primary_release_date.desc", 50, None),
    };

    DiscoverQuery {
        sort_by,
        min_vote_count,
        min_vote_average,
        min_runtime: MIN_RUNTIME,
        release_date_gte: start_date,
        release_date_lte: end_date.map_or(today, |end| end.min(today)),
        page: 1,
    }
}

/// Strip Romance and Music unless they are the movie's only genres
///
/// Order of the remaining ids is preserved. Ids unknown to the map count as
/// "other" genres.
pub fn suppress_noise_genres(genre_ids: &[u32], map: &MovieGenreMap) -> Vec<u32> {
    let noise: Vec<u32> = NOISE_GENRES.iter().filter_map(|name| map.id_of(name)).collect();

    let has_other = genre_ids.iter().any(|id| !noise.contains(id));
    if !has_other {
        return genre_ids.to_vec();
    }

    genre_ids
        .iter()
        .copied()
        .filter(|id| !noise.contains(id))
        .collect()
}

/// Normalize one discover result
pub fn normalize_movie(movie: TmdbMovie, map: &MovieGenreMap, image_base_url: &str) -> MediaRecord {
    let genre_ids = suppress_noise_genres(&movie.genre_ids, map);
    let genres = genre_ids
        .iter()
        .filter_map(|id| map.name_of(*id))
        .map(str::to_string)
        .collect();

    let poster_url = movie
        .poster_path
        .filter(|path| !path.is_empty())
        .map(|path| format!("{}{}", image_base_url, path));

    MediaRecord {
        id: movie.id,
        title: movie.title.unwrap_or_default(),
        release_date: movie
            .release_date
            .filter(|date| !date.is_empty())
            .unwrap_or_else(|| UNKNOWN_RELEASE_DATE.to_string()),
        rating: movie.vote_average,
        votes: movie.vote_count,
        genre_ids: Some(genre_ids),
        genres,
        poster_url,
    }
}

/// Fetch up to `params.limit` movies
///
/// The genre map is fetched once up front to attach names and find the noise
/// genres. Pages are requested back to back.
pub async fn fetch_movies(
    source: &dyn MovieSource,
    params: &MovieFetchParams,
    settings: &MovieFetchSettings,
) -> Result<FetchOutcome, ProviderError> {
    let today = Local::now().date_naive();
    let query = discover_query(params.sort, params.start_date, params.end_date, today);

    info!(
        sort = %params.sort,
        start_date = ?params.start_date,
        end_date = ?params.end_date,
        limit = params.limit,
        "Fetching movie master list"
    );

    let map = MovieGenreMap::load(source).await?;

    let limits = PageLimits {
        limit: params.limit,
        max_pages: settings.max_pages,
        page_delay: Duration::ZERO,
    };

    collect_pages(
        "tmdb",
        limits,
        |page| {
            let query = DiscoverQuery {
                page,
                ..query.clone()
            };
            async move { source.discover_movies(&query).await }
        },
        |movie| normalize_movie(movie, &map, &settings.image_base_url),
    )
    .await
}
