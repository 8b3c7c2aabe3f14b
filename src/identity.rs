//! Bidirectional mapping between work item ids and host-assigned node ids.

use std::collections::HashMap;

/// Keeps external (work item) ids and visualization (host node) ids in sync.
///
/// Entries are overwritten, never merged or removed: an id whose node disappeared
/// from the host stays mapped until a later record replaces it.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    by_external: HashMap<String, String>,
    by_visual: HashMap<String, String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, external_id: impl Into<String>, visual_id: impl Into<String>) {
        let external_id = external_id.into();
        let visual_id = visual_id.into();
        self.by_visual.insert(visual_id.clone(), external_id.clone());
        self.by_external.insert(external_id, visual_id);
    }

    pub fn visual_id(&self, external_id: &str) -> Option<&str> {
        self.by_external.get(external_id).map(String::as_str)
    }

    pub fn external_id(&self, visual_id: &str) -> Option<&str> {
        self.by_visual.get(visual_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_external.is_empty()
    }
}
