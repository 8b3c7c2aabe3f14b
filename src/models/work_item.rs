use serde::{Deserialize, Serialize};

use super::{null_as_empty, PathNode};

/// A unit of planned work as delivered by the data provider.
///
/// Work items are an immutable snapshot of one refresh cycle: a new load replaces
/// the whole set instead of patching individual items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkItemType,
    pub state: WorkItemState,
    /// Iteration (sprint) name the item is planned for.
    #[serde(default)]
    pub iteration: Option<String>,
    /// Direct link to the item in the provider's web UI.
    #[serde(default)]
    pub remote_ref: Option<String>,
    /// Child work item ids, in provider order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<String>,
}

/// The kind of a work item.
///
/// Types the provider sends that are not listed here deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkItemType {
    Program,
    Epic,
    Feature,
    Story,
    Task,
    Bug,
    Issue,
    #[serde(other)]
    Unknown,
}

impl WorkItemType {
    pub const ALL: [WorkItemType; 8] = [
        Self::Program,
        Self::Epic,
        Self::Feature,
        Self::Story,
        Self::Task,
        Self::Bug,
        Self::Issue,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "PROGRAM",
            Self::Epic => "EPIC",
            Self::Feature => "FEATURE",
            Self::Story => "STORY",
            Self::Task => "TASK",
            Self::Bug => "BUG",
            Self::Issue => "ISSUE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Map a provider work item type name ("User Story", "Bug", ...) onto a type.
    ///
    /// Unrecognised names are treated as epics.
    pub fn from_provider_name(name: &str) -> Self {
        match name {
            "Feature" => Self::Feature,
            "User Story" => Self::Story,
            "Issue" => Self::Issue,
            "Task" => Self::Task,
            "Bug" => Self::Bug,
            _ => Self::Epic,
        }
    }
}

/// The workflow state of a work item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkItemState {
    Backlog,
    InProgress,
    Completed,
    Removed,
    #[serde(other)]
    Unknown,
}

impl WorkItemState {
    pub const ALL: [WorkItemState; 5] = [
        Self::Backlog,
        Self::InProgress,
        Self::Completed,
        Self::Removed,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Removed => "REMOVED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Map a provider state name ("Active", "Closed", ...) onto a state.
    pub fn from_provider_name(name: &str) -> Self {
        match name {
            "Active" => Self::InProgress,
            "Resolved" | "Closed" => Self::Completed,
            "Removed" => Self::Removed,
            _ => Self::Backlog,
        }
    }
}

/// The payload of one data load: the flat work item list plus the layout forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemResults {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_items: Vec<WorkItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work_paths: Vec<PathNode>,
}
