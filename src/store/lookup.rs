//! HTTP lookup of the published store version.
//!
//! The lookup endpoint answers a GET with a JSON document shaped like:
//!
//! ```json
//! { "resultCount": 1, "results": [ { "version": "2.2.0", "trackId": 123 } ] }
//! ```
//!
//! Only `results[0].version` is read. Anything else (a non-200 status, a
//! different shape, an empty `results` array, a missing or blank version)
//! is reported as an error and treated by the orchestrator as "no data".

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::MetadataSource;
use crate::core::{UpdateError, UpdateResult};

/// Default lookup endpoint. `{id}` is replaced by the application identifier.
pub const DEFAULT_LOOKUP_ENDPOINT: &str = "https://itunes.apple.com/lookup?id={id}";

/// Top-level lookup response.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub results: Vec<LookupResult>,
}

/// One entry of the lookup response. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResult {
    pub version: Option<String>,
}

impl LookupResponse {
    /// The version of the first result, if it has a non-blank one.
    pub fn first_version(&self) -> Option<&str> {
        self.results
            .first()
            .and_then(|result| result.version.as_deref())
            .map(str::trim)
            .filter(|version| !version.is_empty())
    }
}

/// [`MetadataSource`] backed by the store's public lookup endpoint.
#[derive(Debug, Clone)]
pub struct AppStoreLookup {
    client: reqwest::Client,
    endpoint: String,
}

impl AppStoreLookup {
    /// Lookup against [`DEFAULT_LOOKUP_ENDPOINT`].
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_LOOKUP_ENDPOINT)
    }

    /// Lookup against a custom endpoint template containing `{id}`.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// The request URL for `app_id`.
    pub fn url_for(&self, app_id: &str) -> String {
        self.endpoint.replace("{id}", app_id)
    }
}

impl Default for AppStoreLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataSource for AppStoreLookup {
    async fn fetch_store_version(&self, app_id: &str, timeout: Duration) -> UpdateResult<String> {
        let url = self.url_for(app_id);
        debug!(%url, "Looking up store version");

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        if response.status() != StatusCode::OK {
            return Err(UpdateError::LookupStatus(response.status().as_u16()));
        }

        let body = response.text().await.map_err(|e| classify(e, timeout))?;
        let parsed: LookupResponse = serde_json::from_str(&body)
            .map_err(|e| UpdateError::MalformedMetadata(format!("invalid lookup JSON: {e}")))?;

        parsed
            .first_version()
            .map(str::to_string)
            .ok_or_else(|| UpdateError::MalformedMetadata("no version in first result".into()))
    }
}

fn classify(error: reqwest::Error, timeout: Duration) -> UpdateError {
    if error.is_timeout() {
        UpdateError::Timeout(timeout)
    } else {
        UpdateError::Lookup(error)
    }
}
