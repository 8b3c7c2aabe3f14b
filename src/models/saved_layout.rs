use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A version snapshot of a host map, posted back to the provider after a save.
///
/// The blob is opaque to the provider; only its size is inspected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLayout {
    pub id: Uuid,
    /// Monotonic version number, starting at 1.
    pub version: i64,
    pub bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// A saved layout including its blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedLayoutWithBlob {
    #[serde(flatten)]
    pub layout: SavedLayout,
    pub json: String,
}
