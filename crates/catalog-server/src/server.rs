//! HTTP surface.
//!
//! Multi-valued filters repeat their key in the query string
//! (`selected_genres=Action&selected_genres=Drama`), so handlers read the raw
//! query rather than a typed extractor.

use crate::genres::GenreSelection;
use crate::search::{AnimeRequest, AnimeSearch, MovieRequest, MovieSearch};
use axum::extract::{RawQuery, State};
use axum::http::{Request, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::json;
use shared::{GenreEntry, MediaRecord, SortMode};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use url::form_urlencoded;

/// Records returned by the best-last-year endpoints
const BEST_LIMIT: usize = 300;

/// Days covered by "last year"
const LAST_YEAR_DAYS: i64 = 365;

#[derive(Clone)]
pub struct AppState {
    pub movies: Arc<MovieSearch>,
    pub anime: Arc<AnimeSearch>,
}

/// Internal failure rendered as `500 {"detail": ...}`
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = format!("{:#}", self.0);
        error!(error = %detail, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": detail }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct BestMovies {
    pub movies: Vec<MediaRecord>,
    pub available_genres: Vec<GenreEntry<u32>>,
}

#[derive(Debug, Serialize)]
pub struct BestAnime {
    pub anime: Vec<MediaRecord>,
    pub available_genres: Vec<GenreEntry<String>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/genres", get(movie_genres))
        .route("/api/movies/best-last-year", get(best_movies))
        .route("/api/anime/genres", get(anime_genres))
        .route("/api/anime/best-last-year", get(best_anime))
        .route("/health", get(health))
        .layer(from_fn(log_requests))
        .with_state(state)
}

/// First day of the "last year" window ending `today`
pub fn last_year_start(today: NaiveDate) -> NaiveDate {
    today - chrono::Duration::days(LAST_YEAR_DAYS)
}

/// All values of a repeated query parameter, in order
fn query_values(query: Option<&str>, key: &str) -> Vec<String> {
    query
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

fn selection_from_query(query: Option<&str>) -> GenreSelection {
    GenreSelection::new(
        query_values(query, "selected_genres"),
        query_values(query, "excluded_genres"),
    )
}

async fn movie_genres(State(state): State<AppState>) -> ApiResult<Vec<GenreEntry<u32>>> {
    let map = state.movies.genres().await?;
    Ok(Json(map.entries()))
}

async fn best_movies(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<BestMovies> {
    let request = MovieRequest {
        selection: selection_from_query(query.as_deref()),
        sort: SortMode::Popular,
        start_date: Some(last_year_start(Local::now().date_naive())),
        end_date: None,
        limit: BEST_LIMIT,
    };

    let movies = state.movies.search(&request).await?;

    let present: HashSet<u32> = movies
        .iter()
        .filter_map(|m| m.genre_ids.as_deref())
        .flatten()
        .copied()
        .collect();

    let map = state.movies.genres().await?;
    let mut available_genres: Vec<GenreEntry<u32>> = map
        .entries()
        .into_iter()
        .filter(|entry| present.contains(&entry.id))
        .collect();
    available_genres.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(BestMovies {
        movies,
        available_genres,
    }))
}

async fn anime_genres(State(state): State<AppState>) -> ApiResult<Vec<GenreEntry<String>>> {
    Ok(Json(state.anime.genres().await?))
}

async fn best_anime(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> ApiResult<BestAnime> {
    let request = AnimeRequest {
        selection: selection_from_query(query.as_deref()),
        start_date: Some(last_year_start(Local::now().date_naive())),
        end_date: None,
        limit: BEST_LIMIT,
    };

    let anime = state.anime.search(&request).await?;

    let names: BTreeSet<&str> = anime
        .iter()
        .flat_map(|a| a.genres.iter().map(String::as_str))
        .collect();
    let available_genres = names
        .into_iter()
        .map(|name| GenreEntry {
            name: name.to_string(),
            id: name.to_string(),
        })
        .collect();

    Ok(Json(BestAnime {
        anime,
        available_genres,
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn log_requests(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    if uri.path() == "/health" {
        return next.run(req).await;
    }

    let start = Instant::now();
    let response = next.run(req).await;
    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}
