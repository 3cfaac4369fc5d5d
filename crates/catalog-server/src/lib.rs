//! Best-of-year movie and anime catalog.
//!
//! Fetches master lists of top-rated movies (TMDB) and anime (Jikan), caches
//! them per query shape, and serves genre-filtered views over HTTP.

pub mod api;
pub mod cache;
pub mod fetch;
pub mod genres;
pub mod search;
pub mod server;

#[cfg(test)]
mod testing;

pub use api::{JikanClient, ProviderError, TmdbClient};
pub use cache::TtlCache;
pub use fetch::FetchOutcome;
pub use genres::{GenreSelection, MovieGenreMap};
pub use search::{AnimeRequest, AnimeSearch, MovieRequest, MovieSearch};
pub use server::{router, AppState};
