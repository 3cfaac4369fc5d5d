//! Helpers shared by the provider clients.

use super::error::ProviderError;
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "catalog-server/0.1.0";

/// Build the HTTP client used for one provider
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}

/// Turn a response into a typed payload
///
/// Non-2xx statuses become `ProviderError::Status`; the body is decoded with
/// serde_json so a shape mismatch is reported as `Decode`, not as transport.
pub async fn read_json<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, ProviderError> {
    let status = response.status();

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        warn!(url = %url, status = %status, error = %body, "Request failed");

        return Err(ProviderError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await.map_err(|e| ProviderError::Transport {
        url: url.to_string(),
        source: e,
    })?;

    let data = serde_json::from_str(&body).map_err(|e| {
        warn!(url = %url, error = %e, "Failed to parse response");
        ProviderError::Decode {
            url: url.to_string(),
            source: e,
        }
    })?;

    debug!(url = %url, "Request successful");
    Ok(data)
}
