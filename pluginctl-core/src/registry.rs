//! Remote plugin catalog client
//!
//! Queries the catalog over HTTP:
//!
//! - `GET <repo>/repo` lists every available plugin ([`PluginRepo`])
//! - `GET <repo>/repo/<plugin-id>` describes a single plugin ([`Plugin`])
//!
//! Every request carries the host version in a `grafana-version` header and
//! in the `User-Agent`. No retries are performed here.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{PluginError, Result};
use crate::models::{Plugin, PluginRepo};

/// Header carrying the host version
pub const VERSION_HEADER: &str = "grafana-version";

/// Path segment of the catalog endpoints
const REPO_SEGMENT: &str = "repo";

/// Client for the remote plugin catalog
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RegistryClient {
    /// Build a client from an immutable configuration
    ///
    /// TLS certificates are always verified.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let build_error = |reason: String| PluginError::RequestBuildFailed {
            url: config.repo_url.clone(),
            reason,
        };

        let version = HeaderValue::from_str(&config.version)
            .map_err(|e| build_error(format!("invalid version '{}': {e}", config.version)))?;

        let mut headers = HeaderMap::new();
        headers.insert(VERSION_HEADER, version);

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| build_error(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List all plugins from the configured catalog
    pub async fn list_all_plugins(&self) -> Result<PluginRepo> {
        self.list_all_plugins_from(&self.config.repo_url).await
    }

    /// List all plugins from the catalog at `repo_url`
    pub async fn list_all_plugins_from(&self, repo_url: &str) -> Result<PluginRepo> {
        let url = catalog_url(repo_url, &[REPO_SEGMENT])?;
        self.get_json(url).await
    }

    /// Fetch a single plugin from the configured catalog
    pub async fn get_plugin(&self, plugin_id: &str) -> Result<Plugin> {
        self.get_plugin_from(&self.config.repo_url, plugin_id).await
    }

    /// Fetch a single plugin from the catalog at `repo_url`
    pub async fn get_plugin_from(&self, repo_url: &str, plugin_id: &str) -> Result<Plugin> {
        let url = catalog_url(repo_url, &[REPO_SEGMENT, plugin_id])?;
        self.get_json(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let url_text = url.to_string();
        tracing::debug!(
            url = %url_text,
            version = %self.config.version,
            "Querying plugin registry"
        );

        let response = self.client.get(url).send().await.map_err(|source| {
            tracing::info!("Failed to create request: {}", source);
            PluginError::RequestFailed {
                url: url_text.clone(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PluginError::UnexpectedStatus {
                url: url_text,
                status,
            });
        }

        // Consumes the response, releasing the connection on every path
        let body = response
            .bytes()
            .await
            .map_err(|source| PluginError::RequestFailed {
                url: url_text.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| {
            tracing::info!("Failed to decode registry response: {}", source);
            PluginError::DecodeFailed {
                url: url_text,
                source,
            }
        })
    }
}

/// Append path segments to a catalog base URL
///
/// Each segment is percent-encoded as a single path segment. Empty, `.` and
/// `..` segments are rejected so the result always stays under the base.
pub fn catalog_url(base: &str, segments: &[&str]) -> Result<Url> {
    let build_error = |reason: &str| PluginError::RequestBuildFailed {
        url: base.to_string(),
        reason: reason.to_string(),
    };

    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || **s == "." || **s == "..")
    {
        return Err(build_error(&format!("invalid path segment '{bad}'")));
    }

    let mut url = Url::parse(base).map_err(|e| build_error(&e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| build_error("URL cannot be used as a base"))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}
