//! In-memory render host.
//!
//! Keeps nodes and links in insertion order and assigns random UUIDs, like the real
//! host does. Used for `--dry-run` layouts and as the host in tests, where individual
//! calls can be made to fail.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{HostError, HostLink, HostNode, HostUser, LinkProps, ListFilter, NodeProps, RenderHost};

/// Call counters, for asserting what a layout pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub links_created: usize,
    pub links_deleted: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MapState {
    nodes: Vec<NodeProps>,
    links: Vec<LinkProps>,
}

#[derive(Debug, Default)]
struct Inner {
    map: MapState,
    stats: MemoryStats,
    failing_notes: HashSet<String>,
    fail_links: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryHost {
    user_id: String,
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new("local-user")
    }
}

impl MemoryHost {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("host lock poisoned")
    }

    /// Reject create/update calls for nodes carrying `external_id` in their notes.
    pub fn fail_nodes_for(&self, external_id: impl Into<String>) {
        self.lock().failing_notes.insert(external_id.into());
    }

    /// Reject every link creation.
    pub fn fail_link_creation(&self) {
        self.lock().fail_links = true;
    }

    pub fn nodes(&self) -> Vec<NodeProps> {
        self.lock().map.nodes.clone()
    }

    pub fn links(&self) -> Vec<LinkProps> {
        self.lock().map.links.clone()
    }

    /// The node whose notes carry `external_id`.
    pub fn node_for(&self, external_id: &str) -> Option<NodeProps> {
        self.lock()
            .map
            .nodes
            .iter()
            .find(|n| n.notes == external_id)
            .cloned()
    }

    pub fn stats(&self) -> MemoryStats {
        self.lock().stats
    }

    fn to_host_node(props: &NodeProps) -> HostNode {
        HostNode {
            uuid: props.uuid.clone().unwrap_or_default(),
            title: props.title.clone(),
            notes: Some(props.notes.clone()),
            location: Some(props.location),
        }
    }

    fn to_host_link(props: &LinkProps) -> HostLink {
        HostLink {
            uuid: props.uuid.clone().unwrap_or_default(),
            from_uuid: Some(props.from_uuid.clone()),
            to_uuid: Some(props.to_uuid.clone()),
            title: Some(props.title.clone()),
        }
    }
}

fn filter_accepts(filter: &ListFilter, uuid: Option<&String>) -> bool {
    match &filter.uuid {
        Some(wanted) => uuid == Some(wanted),
        None => true,
    }
}

#[async_trait]
impl RenderHost for MemoryHost {
    fn is_installed(&self) -> bool {
        true
    }

    async fn get_user(&self) -> Result<HostUser, HostError> {
        Ok(HostUser {
            user_id: self.user_id.clone(),
        })
    }

    async fn list_nodes(&self, filter: &ListFilter) -> Result<Vec<HostNode>, HostError> {
        Ok(self
            .lock()
            .map
            .nodes
            .iter()
            .filter(|n| filter_accepts(filter, n.uuid.as_ref()))
            .map(Self::to_host_node)
            .collect())
    }

    async fn create_node(&self, props: &NodeProps) -> Result<String, HostError> {
        let mut inner = self.lock();
        if inner.failing_notes.contains(&props.notes) {
            return Err(HostError::Rejected(format!("createNode {}", props.notes)));
        }
        let uuid = Uuid::new_v4().to_string();
        let mut node = props.clone();
        node.uuid = Some(uuid.clone());
        inner.map.nodes.push(node);
        inner.stats.nodes_created += 1;
        Ok(uuid)
    }

    async fn update_node(&self, props: &NodeProps) -> Result<String, HostError> {
        let mut inner = self.lock();
        if inner.failing_notes.contains(&props.notes) {
            return Err(HostError::Rejected(format!("updateNode {}", props.notes)));
        }
        let uuid = props
            .uuid
            .clone()
            .ok_or_else(|| HostError::Rejected("updateNode without uuid".to_string()))?;
        let slot = inner
            .map
            .nodes
            .iter_mut()
            .find(|n| n.uuid.as_ref() == Some(&uuid))
            .ok_or_else(|| HostError::NotFound(uuid.clone()))?;
        *slot = props.clone();
        inner.stats.nodes_updated += 1;
        Ok(uuid)
    }

    async fn list_links(&self, filter: &ListFilter) -> Result<Vec<HostLink>, HostError> {
        Ok(self
            .lock()
            .map
            .links
            .iter()
            .filter(|l| filter_accepts(filter, l.uuid.as_ref()))
            .map(Self::to_host_link)
            .collect())
    }

    async fn create_link(&self, props: &LinkProps) -> Result<(), HostError> {
        let mut inner = self.lock();
        if inner.fail_links {
            return Err(HostError::Rejected("createLink".to_string()));
        }
        let mut link = props.clone();
        link.uuid = Some(Uuid::new_v4().to_string());
        inner.map.links.push(link);
        inner.stats.links_created += 1;
        Ok(())
    }

    async fn delete_link(&self, uuid: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        let before = inner.map.links.len();
        inner.map.links.retain(|l| l.uuid.as_deref() != Some(uuid));
        if inner.map.links.len() == before {
            return Err(HostError::NotFound(uuid.to_string()));
        }
        inner.stats.links_deleted += 1;
        Ok(())
    }

    async fn save_json(&self) -> Result<String, HostError> {
        serde_json::to_string(&self.lock().map).map_err(|e| HostError::Rejected(e.to_string()))
    }

    async fn load_json(&self, json: &str) -> Result<(), HostError> {
        let map: MapState =
            serde_json::from_str(json).map_err(|e| HostError::Rejected(e.to_string()))?;
        self.lock().map = map;
        Ok(())
    }

    async fn clear_map(&self) -> Result<(), HostError> {
        self.lock().map = MapState::default();
        Ok(())
    }
}
