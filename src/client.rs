//! HTTP client for the agile data provider.
//!
//! The provider serves work items, iterations and saved queries under a base path such
//! as `http://localhost:8080/api/agile`. Path segments (team, sprint and query names)
//! are percent-encoded, so names with spaces or slashes are safe to pass through.

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::models::{Iteration, QueryItem, WorkItemResults};

/// Provider client errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

#[derive(Debug, Clone)]
pub struct ProviderClient {
    base_url: String,
    client: Client,
}

impl ProviderClient {
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.provider_url.clone())
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Append `segments` to the base URL, encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::handle_response(response).await
    }

    /// Convert non-success statuses to `ProviderError`, otherwise decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound(body)),
            StatusCode::BAD_REQUEST => Err(ProviderError::BadRequest(body)),
            _ => Err(ProviderError::Server(format!("{}: {}", status, body))),
        }
    }

    // ============================================================
    // Metadata
    // ============================================================

    pub async fn organizations(&self) -> Result<Vec<String>, ProviderError> {
        self.get(self.url(&["organization"])?).await
    }

    pub async fn projects(&self) -> Result<Vec<String>, ProviderError> {
        self.get(self.url(&["projects"])?).await
    }

    pub async fn teams(&self) -> Result<Vec<String>, ProviderError> {
        self.get(self.url(&["teams"])?).await
    }

    /// Iterations of a team.
    pub async fn sprints(&self, team: &str) -> Result<Vec<Iteration>, ProviderError> {
        let mut url = self.url(&["sprints"])?;
        url.query_pairs_mut().append_pair("team", team);
        self.get(url).await
    }

    pub async fn queries(&self) -> Result<Vec<QueryItem>, ProviderError> {
        self.get(self.url(&["queries"])?).await
    }

    // ============================================================
    // Work items
    // ============================================================

    pub async fn items_by_sprint(
        &self,
        team: &str,
        sprint: &str,
    ) -> Result<WorkItemResults, ProviderError> {
        self.get(self.url(&["items", "team", team, "sprint", sprint])?)
            .await
    }

    pub async fn query_results(
        &self,
        query_id: &str,
        team: &str,
    ) -> Result<WorkItemResults, ProviderError> {
        self.get(self.url(&["query", query_id, "team", team])?).await
    }

    // ============================================================
    // Saved maps
    // ============================================================

    /// Send a saved map to the provider. The response body is ignored.
    pub async fn post_map(&self, map_json: &str) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(self.url(&["map"])?)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(map_json.to_string())
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_encoded() {
        let client = ProviderClient::new("http://localhost:8080/api/agile");
        let url = client
            .url(&["items", "team", "Core Team", "sprint", "Sprint 1/a"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/agile/items/team/Core%20Team/sprint/Sprint%201%2Fa"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let client = ProviderClient::new("http://localhost:8080/api/agile/");
        let url = client.url(&["teams"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/agile/teams");
    }

    #[test]
    fn bad_base_url_is_reported() {
        let client = ProviderClient::new("not a url");
        assert!(matches!(client.url(&["teams"]), Err(ProviderError::InvalidUrl(_))));
    }
}
