use crate::autoupdate::update_set::UpdateSet;
use crate::config::Config;
use crate::error::{AutoUpdateError, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

const MAX_UPDATE_SET_BYTES: usize = 10 * 1024 * 1024;

/// Source of update sets.
pub trait UpdateFeed {
    fn fetch_update_set(&self, id: &str) -> Result<UpdateSet>;
}

/// Blocking HTTP client for the update feed service.
pub struct FeedClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    project_slug: String,
    project_branch: String,
}

impl FeedClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_http_client(config, Self::build_client()?)
    }

    pub fn with_http_client(config: &Config, client: Client) -> Result<Self> {
        if config.project_slug.trim().is_empty() {
            return Err(AutoUpdateError::Config(
                "project_slug is required to fetch update sets".to_string(),
            ));
        }

        let endpoint = Url::parse(&config.api_endpoint).map_err(|e| {
            AutoUpdateError::Config(format!(
                "Invalid api_endpoint '{}': {}",
                config.api_endpoint, e
            ))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(AutoUpdateError::Config(format!(
                "api_endpoint '{}' cannot be used as a base URL",
                config.api_endpoint
            )));
        }

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            project_slug: config.project_slug.clone(),
            project_branch: config.project_branch.clone(),
        })
    }

    /// Each segment is percent-encoded, so a branch like `feature/foo` stays one segment.
    fn update_set_url(&self, id: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AutoUpdateError::Config(format!(
                    "api_endpoint '{}' cannot be used as a base URL",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_slug.as_str(),
                "branches",
                self.project_branch.as_str(),
                "update_sets",
                id,
            ]);
        Ok(url)
    }

    fn build_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("autoupdate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AutoUpdateError::Feed(format!("Failed to build HTTP client: {}", e)))
    }
}

impl UpdateFeed for FeedClient {
    fn fetch_update_set(&self, id: &str) -> Result<UpdateSet> {
        let url = self.update_set_url(id)?;
        tracing::debug!(%url, "fetching update set");

        let mut request = self.client.get(url.clone());
        if !self.api_key.is_empty() {
            request = request.basic_auth("X", Some(&self.api_key));
        }

        let response = request
            .send()
            .map_err(|e| AutoUpdateError::Feed(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AutoUpdateError::Feed(format!("HTTP {}: {}", status, url)));
        }

        let text = response
            .text()
            .map_err(|e| AutoUpdateError::Feed(format!("Failed to read response: {}", e)))?;

        if text.len() > MAX_UPDATE_SET_BYTES {
            return Err(AutoUpdateError::Feed(
                "Update set response exceeded 10MB limit".to_string(),
            ));
        }

        let update_set: UpdateSet = serde_json::from_str(&text)?;
        tracing::debug!(
            id = update_set.id,
            ecosystems = update_set.ecosystems().len(),
            "decoded update set"
        );
        Ok(update_set)
    }
}
