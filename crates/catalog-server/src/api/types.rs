//! Provider response types.
//!
//! These types represent the JSON responses from TMDB and Jikan API v4.
//! Only the fields the catalog reads are declared; anything optional upstream
//! is an `Option` so absent fields never turn into silent defaults.

use serde::Deserialize;

/// TMDB `GET /genre/movie/list`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbGenre {
    pub id: u32,
    pub name: String,
}

/// TMDB `GET /discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDiscoverPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub poster_path: Option<String>,
}

/// Jikan `{"data": [...]}` envelope; a missing `data` reads as an empty page
#[derive(Debug, Clone, Deserialize)]
pub struct DataResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Genre item from `GET /genres/anime`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryItem {
    pub name: String,
}

/// Anime entry from `GET /anime`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JikanAnime {
    pub mal_id: u64,
    pub title: String,
    pub title_english: Option<String>,
    pub score: Option<f64>,
    pub scored_by: Option<u64>,
    #[serde(default)]
    pub genres: Vec<MalEntity>,
    pub images: Option<AnimeImages>,
    pub aired: Option<Aired>,
}

/// MAL entity (genre, theme, demographic)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MalEntity {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimeImages {
    pub jpg: Option<ImageSet>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

/// Aired dates as ISO timestamps
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Aired {
    pub from: Option<String>,
}
