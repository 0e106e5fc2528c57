//! Dataset retrieval from the local data API.

use crate::data::Dataset;
use anyhow::{Context, Result};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/data";

/// Client for the data endpoint. One GET, no auth, no retries.
pub struct DataClient {
    url: String,
    client: reqwest::blocking::Client,
}

impl DataClient {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_ENDPOINT.to_string())
    }

    pub fn with_url(url: String) -> Self {
        Self {
            url,
            client: reqwest::blocking::Client::builder()
                .no_proxy()
                .build()
                .unwrap_or_else(|_| reqwest::blocking::Client::new()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn fetch_dataset(&self) -> Result<Dataset> {
        log::info!("fetching dataset from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("Endpoint {} returned an error status", self.url))?;

        let body = response.text().context("Failed to read response body")?;
        let dataset = Dataset::from_json_str(&body)?;

        log::debug!("received {} records", dataset.len());
        Ok(dataset)
    }
}

impl Default for DataClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience wrapper around [`DataClient::fetch_dataset`].
pub fn fetch_dataset(url: &str) -> Result<Dataset> {
    DataClient::with_url(url.to_string()).fetch_dataset()
}
