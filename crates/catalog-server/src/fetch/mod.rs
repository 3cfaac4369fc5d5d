//! Master list fetchers.
//!
//! Both providers page through their upstream listing the same way: pages are
//! requested sequentially from 1, records are normalized into `MediaRecord`,
//! and paging stops on an empty page, once the limit is reached, or at the
//! provider's page ceiling.

pub mod anime;
pub mod movies;

use crate::api::ProviderError;
use shared::MediaRecord;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub use anime::{fetch_anime, AnimeFetchParams, AnimeFetchSettings};
pub use movies::{fetch_movies, MovieFetchParams, MovieFetchSettings};

/// Result of a master list fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Paging finished normally
    Complete(Vec<MediaRecord>),
    /// A transport failure stopped paging; `records` holds what came before it
    Interrupted {
        records: Vec<MediaRecord>,
        reason: String,
    },
}

impl FetchOutcome {
    pub fn records(&self) -> &[MediaRecord] {
        match self {
            FetchOutcome::Complete(records) => records,
            FetchOutcome::Interrupted { records, .. } => records,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FetchOutcome::Complete(_))
    }

    /// Treat an interrupted fetch as the records it collected
    pub fn into_records(self) -> Vec<MediaRecord> {
        match self {
            FetchOutcome::Complete(records) => records,
            FetchOutcome::Interrupted { records, reason } => {
                warn!(
                    collected = records.len(),
                    reason = %reason,
                    "Upstream fetch interrupted, serving partial master list"
                );
                records
            }
        }
    }
}

/// Paging bounds for one fetch
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageLimits {
    pub limit: usize,
    pub max_pages: u32,
    pub page_delay: Duration,
}

/// Request pages until empty, full, or out of pages
///
/// Transport failures end paging with `Interrupted`; decode failures propagate.
/// The page delay is only paid when another page will be requested.
pub(crate) async fn collect_pages<T, F, Fut, M>(
    provider: &'static str,
    limits: PageLimits,
    mut fetch_page: F,
    mut normalize: M,
) -> Result<FetchOutcome, ProviderError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ProviderError>>,
    M: FnMut(T) -> MediaRecord,
{
    let mut records = Vec::new();
    let mut page = 1;

    while records.len() < limits.limit {
        let items = match fetch_page(page).await {
            Ok(items) => items,
            Err(e) if e.is_transport() => {
                warn!(
                    provider = provider,
                    page = page,
                    collected = records.len(),
                    error = %e,
                    "Page request failed, stopping"
                );
                return Ok(FetchOutcome::Interrupted {
                    records,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if items.is_empty() {
            debug!(provider = provider, page = page, "Empty page, stopping");
            break;
        }

        for item in items {
            if records.len() >= limits.limit {
                break;
            }
            records.push(normalize(item));
        }

        page += 1;
        if page > limits.max_pages {
            debug!(provider = provider, max_pages = limits.max_pages, "Reached page limit");
            break;
        }

        if records.len() < limits.limit && !limits.page_delay.is_zero() {
            sleep(limits.page_delay).await;
        }
    }

    info!(provider = provider, records = records.len(), "Fetched master list");
    Ok(FetchOutcome::Complete(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::anime_record;
    use std::cell::Cell;
    use std::time::Instant;

    fn limits(limit: usize, max_pages: u32) -> PageLimits {
        PageLimits {
            limit,
            max_pages,
            page_delay: Duration::ZERO,
        }
    }

    fn unavailable() -> ProviderError {
        ProviderError::Status {
            url: "http://upstream/items".to_string(),
            status: 502,
            body: "bad gateway".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stops_at_page_ceiling() {
        let calls = Cell::new(0u32);
        let outcome = collect_pages(
            "test",
            limits(10_000, 5),
            |page| {
                calls.set(calls.get() + 1);
                async move { Ok::<_, ProviderError>(vec![page; 10]) }
            },
            |page| anime_record(page as u64, &[]),
        )
        .await
        .unwrap();

        assert_eq!(calls.get(), 5);
        assert_eq!(outcome.records().len(), 50);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_truncates_to_limit_mid_page() {
        let calls = Cell::new(0u32);
        let outcome = collect_pages(
            "test",
            limits(25, 20),
            |_| {
                calls.set(calls.get() + 1);
                async { Ok::<_, ProviderError>((0..10u64).collect::<Vec<_>>()) }
            },
            |id| anime_record(id, &[]),
        )
        .await
        .unwrap();

        assert_eq!(calls.get(), 3);
        assert_eq!(outcome.records().len(), 25);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_partial_records() {
        let outcome = collect_pages(
            "test",
            limits(100, 20),
            |page| async move {
                if page == 3 {
                    Err(unavailable())
                } else {
                    Ok(vec![u64::from(page); 10])
                }
            },
            |id| anime_record(id, &[]),
        )
        .await
        .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.records().len(), 20);
        assert_eq!(outcome.into_records().len(), 20);
    }

    #[tokio::test]
    async fn test_page_delay_skipped_after_last_page() {
        let started = Instant::now();
        let outcome = collect_pages(
            "test",
            PageLimits {
                limit: 10,
                max_pages: 20,
                page_delay: Duration::from_millis(300),
            },
            |_| async { Ok::<_, ProviderError>((0..10u64).collect::<Vec<_>>()) },
            |id| anime_record(id, &[]),
        )
        .await
        .unwrap();

        assert_eq!(outcome.records().len(), 10);
        assert!(started.elapsed() < Duration::from_millis(300));
    }
}
