//! Genre lookup and include/exclude filtering.
//!
//! A selection is normalized once at the API boundary. Movies resolve names to
//! TMDB ids through a freshly fetched genre map; anime compares names directly.
//! Include is conjunctive (every selected genre must be present), exclude is
//! disjunctive (any excluded genre disqualifies).

use crate::api::{MovieSource, ProviderError, TmdbGenre};
use shared::{GenreEntry, MediaRecord};
use std::collections::HashSet;
use std::hash::Hash;
use tracing::{debug, warn};

/// Include values that mean "no include filter"
const WILDCARDS: [&str; 3] = ["none", "all", "any"];

/// Normalized include/exclude genre names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreSelection {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl GenreSelection {
    /// Normalize raw names: drops blanks and include wildcards
    ///
    /// Names are kept verbatim, so surrounding whitespace is part of the name.
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let include = include
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .filter(|name| !name.trim().is_empty())
            .filter(|name| !WILDCARDS.iter().any(|w| name.eq_ignore_ascii_case(w)))
            .collect();

        let exclude = exclude
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .filter(|name| !name.trim().is_empty())
            .collect();

        Self { include, exclude }
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Movie genre name ↔ TMDB id lookup, in provider order
#[derive(Debug, Clone, Default)]
pub struct MovieGenreMap {
    genres: Vec<TmdbGenre>,
}

impl MovieGenreMap {
    pub fn new(genres: Vec<TmdbGenre>) -> Self {
        Self { genres }
    }

    /// Fetch the current genre list
    ///
    /// A transport failure yields an empty map; a malformed payload propagates.
    pub async fn load(source: &dyn MovieSource) -> Result<Self, ProviderError> {
        match source.movie_genres().await {
            Ok(genres) => {
                debug!(genres = genres.len(), "Loaded movie genre map");
                Ok(Self::new(genres))
            }
            Err(e) if e.is_transport() => {
                warn!(error = %e, "Failed to fetch movie genres, using an empty map");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Id for a genre name, ignoring case
    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.genres
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
            .map(|g| g.id)
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.genres.iter().find(|g| g.id == id).map(|g| g.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    pub fn entries(&self) -> Vec<GenreEntry<u32>> {
        self.genres
            .iter()
            .map(|g| GenreEntry {
                name: g.name.clone(),
                id: g.id,
            })
            .collect()
    }
}

/// Set-based include/exclude predicate over genre keys
#[derive(Debug, Clone)]
pub struct GenreFilter<K> {
    include: HashSet<K>,
    exclude: HashSet<K>,
}

impl<K: Eq + Hash> GenreFilter<K> {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether a record with these genres passes the filter
    pub fn accepts(&self, genres: &HashSet<K>) -> bool {
        if !genres.is_disjoint(&self.exclude) {
            return false;
        }
        self.include.is_subset(genres)
    }

    /// Keep the accepted records, preserving order
    fn retain<F>(&self, records: &[MediaRecord], keys: F) -> Vec<MediaRecord>
    where
        F: Fn(&MediaRecord) -> HashSet<K>,
    {
        if self.is_empty() {
            return records.to_vec();
        }

        records
            .iter()
            .filter(|record| self.accepts(&keys(record)))
            .cloned()
            .collect()
    }
}

impl GenreFilter<u32> {
    /// Resolve a selection to TMDB ids; names missing from the map are dropped
    pub fn for_movies(selection: &GenreSelection, map: &MovieGenreMap) -> Self {
        let resolve = |names: &[String]| -> HashSet<u32> {
            names.iter().filter_map(|name| map.id_of(name)).collect()
        };

        Self {
            include: resolve(selection.include()),
            exclude: resolve(selection.exclude()),
        }
    }

    pub fn apply(&self, movies: &[MediaRecord]) -> Vec<MediaRecord> {
        self.retain(movies, |movie| {
            movie
                .genre_ids
                .as_deref()
                .unwrap_or_default()
                .iter()
                .copied()
                .collect()
        })
    }
}

impl GenreFilter<String> {
    /// Compare lower-cased genre names directly
    pub fn for_anime(selection: &GenreSelection) -> Self {
        let lower = |names: &[String]| -> HashSet<String> {
            names.iter().map(|name| name.to_lowercase()).collect()
        };

        Self {
            include: lower(selection.include()),
            exclude: lower(selection.exclude()),
        }
    }

    pub fn apply(&self, anime: &[MediaRecord]) -> Vec<MediaRecord> {
        self.retain(anime, |entry| {
            entry.genres.iter().map(|g| g.to_lowercase()).collect()
        })
    }
}

/// Filter a movie master list
///
/// An empty selection returns the list as-is without fetching the genre map.
pub async fn filter_movies(
    movies: &[MediaRecord],
    selection: &GenreSelection,
    source: &dyn MovieSource,
) -> Result<Vec<MediaRecord>, ProviderError> {
    if selection.is_empty() {
        return Ok(movies.to_vec());
    }

    let map = MovieGenreMap::load(source).await?;
    Ok(GenreFilter::for_movies(selection, &map).apply(movies))
}

/// Filter an anime master list by genre name
pub fn filter_anime(anime: &[MediaRecord], selection: &GenreSelection) -> Vec<MediaRecord> {
    GenreFilter::for_anime(selection).apply(anime)
}
