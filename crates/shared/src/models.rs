//! Data models for the catalog.
//!
//! This module defines the normalized record shape shared by the movie and
//! anime pipelines, the genre listing entry, and the movie sort mode.

use serde::Serialize;

/// Release date placeholder for records the provider does not date
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown";

/// A normalized movie or anime entry
///
/// Constructed once per upstream item and never mutated afterwards. The movie
/// variant carries `genre_ids`; anime records leave it as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRecord {
    pub id: u64,
    pub title: String,
    pub release_date: String,         // YYYY-MM-DD or "Unknown"
    pub rating: Option<f64>,
    pub votes: Option<u64>,

    // Provider-internal ids, movies only (after noise-genre suppression)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<u32>>,
    pub genres: Vec<String>,

    pub poster_url: Option<String>,
}

/// Genre listing entry as exposed over the API
///
/// Movie genres use the numeric provider id, anime genres use the name itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreEntry<I> {
    pub name: String,
    pub id: I,
}

/// Sort mode for the movie master list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    #[default]
    Latest,
    Popular,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Latest => "latest",
            SortMode::Popular => "popular",
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
