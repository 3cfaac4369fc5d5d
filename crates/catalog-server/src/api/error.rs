//! Provider error type.

use thiserror::Error;

/// Failure talking to an upstream provider
///
/// Everything except `Decode` is a transport failure: the fetch pipeline
/// degrades those to partial results. A payload that does not match the
/// expected shape is an internal failure and propagates.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("{url} kept rate limiting after a retry")]
    RateLimited { url: String },

    #[error("malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ProviderError {
    /// Whether this failure should degrade to "no data" rather than propagate
    pub fn is_transport(&self) -> bool {
        !matches!(self, ProviderError::Decode { .. })
    }
}
