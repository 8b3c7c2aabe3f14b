//! Render host capability interface.
//!
//! The host is the 3D/VR application that draws nodes and links. It is reached through
//! [`RenderHost`], with three bindings:
//! - [`HttpHost`]: live binding talking JSON to the host bridge
//! - [`UnavailableHost`]: stand-in used when no host is installed or reachable
//! - [`MemoryHost`]: in-memory host for dry runs and tests
//!
//! [`connect_host`] picks the live binding or the stub once at startup so call sites
//! never branch on availability themselves.

mod http;
mod memory;
mod unavailable;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::{Color, LinkShape, LinkTrail, Shape};

pub use http::HttpHost;
pub use memory::{MemoryHost, MemoryStats};
pub use unavailable::UnavailableHost;

/// Render host errors.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("host instance not running")]
    Unavailable,

    #[error("host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("host rejected call: {0}")]
    Rejected(String),

    #[error("not found on host: {0}")]
    NotFound(String),
}

/// Node placement relative to the host's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub relative_to: RelativeTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeTo {
    Origin,
}

/// Properties sent with a node create or update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProps {
    /// Host id of the node; `None` on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub title: String,
    pub color: Color,
    pub opacity: f64,
    pub shape: Shape,
    #[serde(default)]
    pub image_url: String,
    /// Carries the work item id so it can be recovered from host nodes.
    pub notes: String,
    #[serde(default)]
    pub page_url: Option<String>,
    pub size: f64,
    pub location: Location,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub collapsed: bool,
}

/// Properties sent with a link create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    pub from_uuid: String,
    pub to_uuid: String,
    pub title: String,
    pub color: Color,
    pub shape: LinkShape,
    pub trail: LinkTrail,
    pub size: f64,
    #[serde(default)]
    pub selected: bool,
}

/// A node as listed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostNode {
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

/// A link as listed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostLink {
    pub uuid: String,
    #[serde(default)]
    pub from_uuid: Option<String>,
    #[serde(default)]
    pub to_uuid: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostUser {
    pub user_id: String,
}

/// Filter for list calls. An empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl ListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
        }
    }
}

/// Capabilities of the render host. Every call may fail.
#[async_trait]
pub trait RenderHost: Send + Sync {
    fn is_installed(&self) -> bool;

    async fn get_user(&self) -> Result<HostUser, HostError>;

    async fn list_nodes(&self, filter: &ListFilter) -> Result<Vec<HostNode>, HostError>;
    /// Returns the host id of the new node.
    async fn create_node(&self, props: &NodeProps) -> Result<String, HostError>;
    /// Returns the host id of the updated node.
    async fn update_node(&self, props: &NodeProps) -> Result<String, HostError>;

    async fn list_links(&self, filter: &ListFilter) -> Result<Vec<HostLink>, HostError>;
    /// Links carry no result; the host assigns their ids, visible through `list_links`.
    async fn create_link(&self, props: &LinkProps) -> Result<(), HostError>;
    async fn delete_link(&self, uuid: &str) -> Result<(), HostError>;

    /// Serialize the whole host map.
    async fn save_json(&self) -> Result<String, HostError>;
    async fn load_json(&self, json: &str) -> Result<(), HostError>;
    async fn clear_map(&self) -> Result<(), HostError>;
}

/// Select the host binding for this process.
///
/// Falls back to [`UnavailableHost`] when no host URL is configured or the host does
/// not answer its `isInstalled` check.
pub async fn connect_host(host_url: Option<&str>) -> Arc<dyn RenderHost> {
    let Some(url) = host_url else {
        tracing::info!("No render host configured, running without one");
        return Arc::new(UnavailableHost);
    };

    match HttpHost::connect(url).await {
        Ok(host) => {
            tracing::info!("Connected to render host at {}", url);
            Arc::new(host)
        }
        Err(e) => {
            tracing::warn!("Render host at {} not available: {}", url, e);
            Arc::new(UnavailableHost)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_props_serialize_in_host_shape() {
        let props = NodeProps {
            uuid: None,
            title: "Login page".to_string(),
            color: Color::Green,
            opacity: 1.0,
            shape: Shape::Diamond,
            image_url: String::new(),
            notes: "42".to_string(),
            page_url: Some("https://example.test/42".to_string()),
            size: 7.0,
            location: Location {
                x: 0.15,
                y: -0.42,
                z: -0.3,
                relative_to: RelativeTo::Origin,
            },
            selected: false,
            collapsed: false,
        };

        let json = serde_json::to_value(&props).unwrap();
        assert!(json.get("uuid").is_none());
        assert_eq!(json["color"], "00CC00");
        assert_eq!(json["shape"], "Diamond");
        assert_eq!(json["pageUrl"], "https://example.test/42");
        assert_eq!(json["location"]["relativeTo"], "Origin");
    }

    #[test]
    fn empty_filter_serializes_to_empty_object() {
        assert_eq!(serde_json::to_string(&ListFilter::all()).unwrap(), "{}");
    }

    #[tokio::test]
    async fn missing_host_url_selects_stub() {
        let host = connect_host(None).await;
        assert!(!host.is_installed());
    }
}
