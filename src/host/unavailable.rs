use async_trait::async_trait;

use super::{HostError, HostLink, HostNode, HostUser, LinkProps, ListFilter, NodeProps, RenderHost};

/// Host binding used when no host is installed. Every call fails with
/// [`HostError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableHost;

#[async_trait]
impl RenderHost for UnavailableHost {
    fn is_installed(&self) -> bool {
        false
    }

    async fn get_user(&self) -> Result<HostUser, HostError> {
        Err(HostError::Unavailable)
    }

    async fn list_nodes(&self, _filter: &ListFilter) -> Result<Vec<HostNode>, HostError> {
        Err(HostError::Unavailable)
    }

    async fn create_node(&self, _props: &NodeProps) -> Result<String, HostError> {
        Err(HostError::Unavailable)
    }

    async fn update_node(&self, _props: &NodeProps) -> Result<String, HostError> {
        Err(HostError::Unavailable)
    }

    async fn list_links(&self, _filter: &ListFilter) -> Result<Vec<HostLink>, HostError> {
        Err(HostError::Unavailable)
    }

    async fn create_link(&self, _props: &LinkProps) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }

    async fn delete_link(&self, _uuid: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }

    async fn save_json(&self) -> Result<String, HostError> {
        Err(HostError::Unavailable)
    }

    async fn load_json(&self, _json: &str) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }

    async fn clear_map(&self) -> Result<(), HostError> {
        Err(HostError::Unavailable)
    }
}
