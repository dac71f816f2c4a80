//! Release index client.
//!
//! A single GET against the configured endpoint, decoded into a [`Release`].
//! No retries: a failed query aborts the update and the operator re-runs it.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::{UpgradeError, UpgradeResult};

/// A published version: its tag, release notes and downloadable files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(rename = "body", default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// GitHub sends `"body": null` for releases without notes.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One downloadable file attached to a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Build the HTTP client shared by the release query and the downloads.
///
/// The client identifies itself as `<app>/<version>`; GitHub rejects requests
/// without a User-Agent.
pub fn build_http_client(
    user_agent: &str,
    request_timeout: Duration,
    connect_timeout: Duration,
) -> UpgradeResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

    reqwest::Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|source| UpgradeError::Network {
            operation: "initializing the HTTP client".to_string(),
            source,
        })
}

/// Fetches release metadata from the release index.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: reqwest::Client,
    url: String,
}

impl ReleaseClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query the latest release.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::Network`] when the request or body transfer fails
    /// - [`UpgradeError::HttpStatus`] for a non-success response
    /// - [`UpgradeError::Decode`] when the body is not a release object
    pub async fn latest_release(&self) -> UpgradeResult<Release> {
        debug!("Querying release index at {}", self.url);

        let response =
            self.client.get(&self.url).send().await.map_err(|source| UpgradeError::Network {
                operation: format!("querying {}", self.url),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpgradeError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|source| UpgradeError::Network {
            operation: format!("reading the response from {}", self.url),
            source,
        })?;

        let release: Release =
            serde_json::from_slice(&body).map_err(|source| UpgradeError::Decode {
                url: self.url.clone(),
                source,
            })?;

        debug!("Latest release is {} with {} assets", release.tag, release.assets.len());
        Ok(release)
    }
}
