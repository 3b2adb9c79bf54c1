//! Reqwest-backed Orthanc REST client.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use bitpacs_core::config::orthanc::OrthancConfig;
use bitpacs_core::{AppError, AppResult};

use crate::types::ChangesFeed;

/// HTTP client for the Orthanc REST API.
///
/// One client serves every facility; the base URL is passed per call
/// because the route resolver picks it per request. Every request is
/// bounded by the configured timeout so a hung upstream cannot block a
/// caller indefinitely; a timeout is an upstream failure like any other.
#[derive(Debug, Clone)]
pub struct OrthancClient {
    client: Client,
    username: String,
    password: String,
}

impl OrthancClient {
    /// Build a client with the configured credentials and timeout.
    pub fn new(config: &OrthancConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    bitpacs_core::error::ErrorKind::Internal,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// `GET {base_url}{path}` returning the raw body text.
    ///
    /// Non-2xx statuses, connection failures, and timeouts all map to an
    /// upstream error; the read-through cache turns those into degraded
    /// payloads at its boundary.
    pub async fn get_text(&self, base_url: &str, path: &str) -> AppResult<String> {
        let url = format!("{base_url}{path}");
        tracing::debug!(%url, "Fetching from Orthanc");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| map_transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(&url, status));
        }

        response
            .text()
            .await
            .map_err(|e| map_transport_error(&url, e))
    }

    /// `GET {base_url}/changes?...` decoded into a [`ChangesFeed`].
    ///
    /// With `since = None` the newest change is requested descending, which
    /// is how a monitor establishes its baseline without reading the feed.
    pub async fn get_changes(
        &self,
        base_url: &str,
        since: Option<u64>,
        limit: u32,
    ) -> AppResult<ChangesFeed> {
        let path = match since {
            Some(cursor) => format!("/changes?since={cursor}&limit={limit}"),
            None => "/changes?descending=true&limit=1".to_string(),
        };
        let body = self.get_text(base_url, &path).await?;
        serde_json::from_str(&body).map_err(|e| {
            AppError::with_source(
                bitpacs_core::error::ErrorKind::Upstream,
                format!("Malformed changes feed from {base_url}: {e}"),
                e,
            )
        })
    }
}

fn map_transport_error(url: &str, err: reqwest::Error) -> AppError {
    let reason = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    AppError::with_source(
        bitpacs_core::error::ErrorKind::Upstream,
        format!("Orthanc request to {url} {reason}: {err}"),
        err,
    )
}

fn map_status_error(url: &str, status: StatusCode) -> AppError {
    AppError::upstream(format!("Orthanc at {url} returned {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitpacs_core::config::orthanc::OrthancConfig;

    fn config() -> OrthancConfig {
        OrthancConfig {
            username: "orthanc".to_string(),
            password: "orthanc".to_string(),
            request_timeout_seconds: 1,
            facilities: Vec::new(),
        }
    }

    #[test]
    fn test_client_builds() {
        assert!(OrthancClient::new(&config()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_maps_to_upstream_error() {
        let client = OrthancClient::new(&config()).unwrap();
        // Reserved TEST-NET address, nothing listens there.
        let err = client
            .get_text("http://192.0.2.1:1", "/statistics")
            .await
            .unwrap_err();
        assert_eq!(err.kind, bitpacs_core::error::ErrorKind::Upstream);
    }
}
