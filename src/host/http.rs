//! Live render host binding.
//!
//! The host bridge exposes each capability as `POST {base}/{capability}` with a JSON
//! body, mirroring the in-app scripting API (`listNodes`, `createNode`, ...).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{HostError, HostLink, HostNode, HostUser, LinkProps, ListFilter, NodeProps, RenderHost};

#[derive(Deserialize)]
struct InstalledResponse {
    installed: bool,
}

#[derive(Deserialize)]
struct UuidResponse {
    uuid: String,
}

#[derive(Deserialize)]
struct NodesResponse {
    #[serde(default)]
    nodes: Vec<HostNode>,
}

#[derive(Deserialize)]
struct LinksResponse {
    #[serde(default)]
    links: Vec<HostLink>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonMap {
    json_string: String,
}

#[derive(Serialize)]
struct UuidRequest<'a> {
    uuid: &'a str,
}

/// HTTP binding to a running render host.
#[derive(Debug, Clone)]
pub struct HttpHost {
    base_url: String,
    client: Client,
}

impl HttpHost {
    /// Bind to the host bridge at `base_url` once it reports itself installed.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self, HostError> {
        let host = Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        };

        let answer: InstalledResponse = host.call("isInstalled", &serde_json::json!({})).await?;
        if !answer.installed {
            return Err(HostError::Unavailable);
        }
        Ok(host)
    }

    fn request<B: Serialize + ?Sized>(&self, capability: &str, body: &B) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{}", self.base_url, capability))
            .json(body)
    }

    async fn call<B, T>(&self, capability: &str, body: &B) -> Result<T, HostError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(capability, body).send().await?;
        let response = Self::check(capability, response).await?;
        Ok(response.json().await?)
    }

    async fn call_empty<B: Serialize + ?Sized>(&self, capability: &str, body: &B) -> Result<(), HostError> {
        let response = self.request(capability, body).send().await?;
        Self::check(capability, response).await?;
        Ok(())
    }

    async fn check(capability: &str, response: reqwest::Response) -> Result<reqwest::Response, HostError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(HostError::NotFound(body)),
            _ => Err(HostError::Rejected(format!("{} {}: {}", capability, status, body))),
        }
    }
}

#[async_trait]
impl RenderHost for HttpHost {
    fn is_installed(&self) -> bool {
        true
    }

    async fn get_user(&self) -> Result<HostUser, HostError> {
        self.call("getUser", &serde_json::json!({})).await
    }

    async fn list_nodes(&self, filter: &ListFilter) -> Result<Vec<HostNode>, HostError> {
        let response: NodesResponse = self.call("listNodes", filter).await?;
        Ok(response.nodes)
    }

    async fn create_node(&self, props: &NodeProps) -> Result<String, HostError> {
        let response: UuidResponse = self.call("createNode", props).await?;
        Ok(response.uuid)
    }

    async fn update_node(&self, props: &NodeProps) -> Result<String, HostError> {
        let response: UuidResponse = self.call("updateNode", props).await?;
        Ok(response.uuid)
    }

    async fn list_links(&self, filter: &ListFilter) -> Result<Vec<HostLink>, HostError> {
        let response: LinksResponse = self.call("listLinks", filter).await?;
        Ok(response.links)
    }

    async fn create_link(&self, props: &LinkProps) -> Result<(), HostError> {
        self.call_empty("createLink", props).await
    }

    async fn delete_link(&self, uuid: &str) -> Result<(), HostError> {
        self.call_empty("deleteLink", &UuidRequest { uuid }).await
    }

    async fn save_json(&self) -> Result<String, HostError> {
        let response: JsonMap = self.call("saveJson", &serde_json::json!({})).await?;
        Ok(response.json_string)
    }

    async fn load_json(&self, json: &str) -> Result<(), HostError> {
        self.call_empty(
            "loadJson",
            &JsonMap {
                json_string: json.to_string(),
            },
        )
        .await
    }

    async fn clear_map(&self) -> Result<(), HostError> {
        self.call_empty("clearMap", &serde_json::json!({})).await
    }
}
