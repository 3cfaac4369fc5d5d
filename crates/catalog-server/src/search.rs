//! Search orchestrators.
//!
//! Each orchestrator owns a master list cache keyed by query shape (provider,
//! sort mode, date range). Genre filters are not part of the key: they are
//! applied on read, then the result is cut to the requested limit.

use crate::api::{AnimeSource, MovieSource};
use crate::cache::TtlCache;
use crate::fetch::{
    fetch_anime, fetch_movies, AnimeFetchParams, AnimeFetchSettings, FetchOutcome,
    MovieFetchParams, MovieFetchSettings,
};
use crate::genres::{filter_anime, filter_movies, GenreSelection, MovieGenreMap};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use dashmap::DashMap;
use shared::config::CacheConfig;
use shared::{GenreEntry, MediaRecord, SortMode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type MasterList = Arc<Vec<MediaRecord>>;

fn date_key(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "None".to_string(), |d| d.to_string())
}

/// Cached master lists plus one refresh gate per key
struct MasterLists {
    cache: TtlCache<MasterList>,
    gates: DashMap<String, Arc<Mutex<()>>>,
}

impl MasterLists {
    fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
            gates: DashMap::new(),
        }
    }

    fn gate(&self, key: &str) -> Arc<Mutex<()>> {
        self.gates.entry(key.to_string()).or_default().clone()
    }

    /// Cached non-empty list, if any
    fn cached(&self, key: &str) -> Option<MasterList> {
        self.cache.get(key).filter(|list| !list.is_empty())
    }

    /// Return the cached list for `key`, fetching and storing it on a miss
    ///
    /// Concurrent misses on the same key wait on its gate and re-check the
    /// cache, so one fetch serves all of them. Other keys are not blocked.
    async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<MasterList>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FetchOutcome>>,
    {
        if let Some(list) = self.cached(key) {
            return Ok(list);
        }

        let gate = self.gate(key);
        let _guard = gate.lock().await;
        if let Some(list) = self.cached(key) {
            debug!(key = key, "Master list filled while waiting");
            return Ok(list);
        }

        info!(key = key, "Master list cache miss, fetching");
        let outcome = fetch().await?;
        if outcome.records().is_empty() {
            warn!(key = key, "Fetched an empty master list");
        }
        let complete = outcome.is_complete();
        let records = Arc::new(outcome.into_records());
        self.cache.set(key, records.clone());
        info!(
            key = key,
            records = records.len(),
            complete = complete,
            cached_lists = self.cache.len(),
            "Master list stored"
        );
        Ok(records)
    }

    fn prime(&self, key: impl Into<String>, records: Vec<MediaRecord>) {
        self.cache.set(key, Arc::new(records));
    }
}

/// Parameters of a movie search
#[derive(Debug, Clone)]
pub struct MovieRequest {
    pub selection: GenreSelection,
    pub sort: SortMode,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: usize,
}

/// Movie search over a cached TMDB master list
pub struct MovieSearch {
    source: Arc<dyn MovieSource>,
    lists: MasterLists,
    settings: MovieFetchSettings,
    master_list_size: usize,
}

impl MovieSearch {
    pub fn new(
        source: Arc<dyn MovieSource>,
        settings: MovieFetchSettings,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            source,
            lists: MasterLists::new(Duration::from_secs(cache.expiration_seconds)),
            settings,
            master_list_size: cache.master_list_size,
        }
    }

    /// Cache key for a query shape, e.g. `master_movies_popular_2025-10-16_None`
    pub fn cache_key(sort: SortMode, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> String {
        format!(
            "master_movies_{}_{}_{}",
            sort,
            date_key(start_date),
            date_key(end_date)
        )
    }

    /// Store a master list without fetching it
    pub fn prime(&self, key: impl Into<String>, records: Vec<MediaRecord>) {
        self.lists.prime(key, records);
    }

    /// Filtered movies, at most `query.limit` of them
    pub async fn search(&self, query: &MovieRequest) -> Result<Vec<MediaRecord>> {
        let key = Self::cache_key(query.sort, query.start_date, query.end_date);

        let master = self
            .lists
            .get_or_fetch(&key, move || async move {
                let params = MovieFetchParams {
                    sort: query.sort,
                    start_date: query.start_date,
                    end_date: query.end_date,
                    limit: self.master_list_size,
                };
                fetch_movies(self.source.as_ref(), &params, &self.settings)
                    .await
                    .context("Failed to fetch movie master list")
            })
            .await?;

        let mut movies = filter_movies(&master, &query.selection, self.source.as_ref())
            .await
            .context("Failed to filter movies by genre")?;
        movies.truncate(query.limit);

        debug!(
            key = %key,
            master = master.len(),
            returned = movies.len(),
            "Movie search complete"
        );
        Ok(movies)
    }

    /// Current movie genre map, empty when TMDB is unreachable
    pub async fn genres(&self) -> Result<MovieGenreMap> {
        MovieGenreMap::load(self.source.as_ref())
            .await
            .context("Failed to load movie genres")
    }
}

/// Parameters of an anime search
#[derive(Debug, Clone)]
pub struct AnimeRequest {
    pub selection: GenreSelection,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: usize,
}

/// Anime search over a cached Jikan master list
pub struct AnimeSearch {
    source: Arc<dyn AnimeSource>,
    lists: MasterLists,
    settings: AnimeFetchSettings,
    master_list_size: usize,
}

impl AnimeSearch {
    pub fn new(
        source: Arc<dyn AnimeSource>,
        settings: AnimeFetchSettings,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            source,
            lists: MasterLists::new(Duration::from_secs(cache.expiration_seconds)),
            settings,
            master_list_size: cache.master_list_size,
        }
    }

    pub fn cache_key(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> String {
        format!("master_anime_{}_{}", date_key(start_date), date_key(end_date))
    }

    pub fn prime(&self, key: impl Into<String>, records: Vec<MediaRecord>) {
        self.lists.prime(key, records);
    }

    pub async fn search(&self, query: &AnimeRequest) -> Result<Vec<MediaRecord>> {
        let key = Self::cache_key(query.start_date, query.end_date);

        let master = self
            .lists
            .get_or_fetch(&key, move || async move {
                let params = AnimeFetchParams {
                    start_date: query.start_date,
                    end_date: query.end_date,
                    limit: self.master_list_size,
                };
                fetch_anime(self.source.as_ref(), &params, &self.settings)
                    .await
                    .context("Failed to fetch anime master list")
            })
            .await?;

        let mut anime = filter_anime(&master, &query.selection);
        anime.truncate(query.limit);

        debug!(
            key = %key,
            master = master.len(),
            returned = anime.len(),
            "Anime search complete"
        );
        Ok(anime)
    }

    /// Anime genre listing; the name doubles as the id
    ///
    /// Empty when Jikan is unreachable.
    pub async fn genres(&self) -> Result<Vec<GenreEntry<String>>> {
        match self.source.anime_genres().await {
            Ok(genres) => Ok(genres
                .into_iter()
                .map(|g| GenreEntry {
                    id: g.name.clone(),
                    name: g.name,
                })
                .collect()),
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Failed to fetch anime genres");
                Ok(Vec::new())
            }
            Err(e) => Err(e).context("Failed to load anime genres"),
        }
    }
}
