//! Upstream provider clients.
//!
//! This module provides the TMDB (movies) and Jikan (anime) clients, their
//! response types, and the source traits the fetch pipeline is written against.

pub mod error;
mod http;
pub mod jikan;
pub mod source;
pub mod tmdb;
pub mod types;

pub use error::ProviderError;
pub use jikan::JikanClient;
pub use source::{AnimeQuery, AnimeSource, DiscoverQuery, MovieSource};
pub use tmdb::TmdbClient;
pub use types::*;
