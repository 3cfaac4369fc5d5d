//! Test fixtures and in-process provider fakes.

use crate::api::{
    AnimeQuery, AnimeSource, CategoryItem, DiscoverQuery, JikanAnime, MalEntity, MovieSource,
    ProviderError, TmdbDiscoverPage, TmdbGenre, TmdbMovie,
};
use crate::genres::MovieGenreMap;
use async_trait::async_trait;
use axum::Router;
use shared::MediaRecord;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Serve `app` on an ephemeral local port, returning its base URL
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// TMDB movie genres, Action first
pub fn movie_genres() -> Vec<TmdbGenre> {
    [
        (28, "Action"),
        (12, "Adventure"),
        (35, "Comedy"),
        (18, "Drama"),
        (27, "Horror"),
        (10402, "Music"),
        (10749, "Romance"),
        (878, "Science Fiction"),
    ]
    .into_iter()
    .map(|(id, name)| TmdbGenre {
        id,
        name: name.to_string(),
    })
    .collect()
}

/// Normalized movie with names resolved from `movie_genres()`
pub fn movie_record(id: u64, genre_ids: &[u32]) -> MediaRecord {
    let map = MovieGenreMap::new(movie_genres());
    MediaRecord {
        id,
        title: format!("Movie {}", id),
        release_date: "2026-03-01".to_string(),
        rating: Some(7.5),
        votes: Some(1200),
        genre_ids: Some(genre_ids.to_vec()),
        genres: genre_ids
            .iter()
            .filter_map(|gid| map.name_of(*gid))
            .map(str::to_string)
            .collect(),
        poster_url: None,
    }
}

pub fn anime_record(id: u64, genres: &[&str]) -> MediaRecord {
    MediaRecord {
        id,
        title: format!("Anime {}", id),
        release_date: "2026-01-10".to_string(),
        rating: Some(8.1),
        votes: Some(50_000),
        genre_ids: None,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        poster_url: None,
    }
}

/// Raw discover result
pub fn tmdb_movie(id: u64, genre_ids: &[u32]) -> TmdbMovie {
    TmdbMovie {
        id,
        title: Some(format!("Movie {}", id)),
        release_date: Some("2026-03-01".to_string()),
        vote_average: Some(7.0),
        vote_count: Some(900),
        genre_ids: genre_ids.to_vec(),
        poster_path: None,
    }
}

/// Raw search result
pub fn jikan_anime(id: u64, genres: &[&str]) -> JikanAnime {
    JikanAnime {
        mal_id: id,
        title: format!("Anime {}", id),
        title_english: None,
        score: Some(8.0),
        scored_by: Some(10_000),
        genres: genres
            .iter()
            .map(|name| MalEntity {
                name: name.to_string(),
            })
            .collect(),
        images: None,
        aired: None,
    }
}

fn outage(url: &str) -> ProviderError {
    ProviderError::Status {
        url: url.to_string(),
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

fn malformed(url: &str) -> ProviderError {
    ProviderError::Decode {
        url: url.to_string(),
        source: serde_json::from_str::<TmdbDiscoverPage>("{\"results\": 5}").unwrap_err(),
    }
}

/// Page contents served by a fake
enum Pages<T> {
    /// Exactly these pages, then empty ones
    Fixed(Vec<Vec<T>>),
    /// Every page holds this many generated items
    Endless(usize),
}

impl<T: Clone> Pages<T> {
    fn page(&self, page: u32, generate: impl Fn(u64) -> T) -> Vec<T> {
        match self {
            Pages::Fixed(pages) => pages.get(page as usize - 1).cloned().unwrap_or_default(),
            Pages::Endless(size) => {
                let first = (page as u64 - 1) * *size as u64 + 1;
                (first..first + *size as u64).map(generate).collect()
            }
        }
    }
}

/// In-process `MovieSource` with call counters
pub struct FakeMovieSource {
    genres: Vec<TmdbGenre>,
    pages: Pages<TmdbMovie>,
    failing_genres: bool,
    failing_at: Option<u32>,
    malformed_at: Option<u32>,
    genre_calls: AtomicUsize,
    page_calls: AtomicUsize,
    queries: Mutex<Vec<DiscoverQuery>>,
}

impl FakeMovieSource {
    fn with_pages(pages: Pages<TmdbMovie>) -> Self {
        Self {
            genres: movie_genres(),
            pages,
            failing_genres: false,
            failing_at: None,
            malformed_at: None,
            genre_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn new(pages: Vec<Vec<TmdbMovie>>) -> Self {
        Self::with_pages(Pages::Fixed(pages))
    }

    /// Never runs out of results
    pub fn endless(page_size: usize) -> Self {
        Self::with_pages(Pages::Endless(page_size))
    }

    /// Genre list requests fail with a 503
    pub fn failing_genres(mut self) -> Self {
        self.failing_genres = true;
        self
    }

    /// The given page fails with a 503
    pub fn failing_at(mut self, page: u32) -> Self {
        self.failing_at = Some(page);
        self
    }

    /// The given page returns a payload that does not decode
    pub fn malformed_at(mut self, page: u32) -> Self {
        self.malformed_at = Some(page);
        self
    }

    pub fn genre_calls(&self) -> usize {
        self.genre_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<DiscoverQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieSource for FakeMovieSource {
    async fn movie_genres(&self) -> Result<Vec<TmdbGenre>, ProviderError> {
        self.genre_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_genres {
            return Err(outage("fake://tmdb/genre/movie/list"));
        }
        Ok(self.genres.clone())
    }

    async fn discover_movies(&self, query: &DiscoverQuery) -> Result<Vec<TmdbMovie>, ProviderError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        // Let concurrent callers interleave
        tokio::task::yield_now().await;

        if self.failing_at == Some(query.page) {
            return Err(outage("fake://tmdb/discover/movie"));
        }
        if self.malformed_at == Some(query.page) {
            return Err(malformed("fake://tmdb/discover/movie"));
        }
        Ok(self.pages.page(query.page, |id| tmdb_movie(id, &[28])))
    }
}

/// In-process `AnimeSource` with call counters
pub struct FakeAnimeSource {
    genres: Vec<CategoryItem>,
    pages: Pages<JikanAnime>,
    failing_genres: bool,
    rate_limited_at: Option<u32>,
    genre_calls: AtomicUsize,
    page_calls: AtomicUsize,
    queries: Mutex<Vec<AnimeQuery>>,
}

impl FakeAnimeSource {
    fn with_pages(pages: Pages<JikanAnime>) -> Self {
        let genres = ["Action", "Comedy", "Drama", "Fantasy", "Horror"]
            .iter()
            .map(|name| CategoryItem {
                name: name.to_string(),
            })
            .collect();

        Self {
            genres,
            pages,
            failing_genres: false,
            rate_limited_at: None,
            genre_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn new(pages: Vec<Vec<JikanAnime>>) -> Self {
        Self::with_pages(Pages::Fixed(pages))
    }

    pub fn endless(page_size: usize) -> Self {
        Self::with_pages(Pages::Endless(page_size))
    }

    pub fn failing_genres(mut self) -> Self {
        self.failing_genres = true;
        self
    }

    /// The given page stays rate limited after the client's retry
    pub fn rate_limited_at(mut self, page: u32) -> Self {
        self.rate_limited_at = Some(page);
        self
    }

    pub fn genre_calls(&self) -> usize {
        self.genre_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<AnimeQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnimeSource for FakeAnimeSource {
    async fn anime_genres(&self) -> Result<Vec<CategoryItem>, ProviderError> {
        self.genre_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_genres {
            return Err(outage("fake://jikan/genres/anime"));
        }
        Ok(self.genres.clone())
    }

    async fn search_anime(&self, query: &AnimeQuery) -> Result<Vec<JikanAnime>, ProviderError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());
        tokio::task::yield_now().await;

        if self.rate_limited_at == Some(query.page) {
            return Err(ProviderError::RateLimited {
                url: "fake://jikan/anime".to_string(),
            });
        }
        Ok(self.pages.page(query.page, |id| jikan_anime(id, &["Action"])))
    }
}
