//! Domain models for agile-map.
//!
//! # Core Concepts
//!
//! ## Provider Data
//!
//! - [`WorkItem`]: A unit of planned work (program, epic, feature, story, task, bug or issue)
//!   with its type, state and parent/child links. Replaced wholesale on every data load.
//! - [`PathNode`]: A node of the layout forest returned alongside the work items. Synthetic
//!   placeholder nodes reserve horizontal space without being drawn.
//! - [`WorkItemResults`]: The combined `{ workItems, workPaths }` payload of one load.
//! - [`Iteration`] and [`QueryItem`]: Sprint and saved-query metadata for selection.
//!
//! ## Provider Storage
//!
//! - [`SavedLayout`]: A versioned snapshot of a host map posted back to the provider.

mod iteration;
mod saved_layout;
mod work_item;
mod work_tree;

pub use iteration::*;
pub use saved_layout::*;
pub use work_item::*;
pub use work_tree::*;

use serde::{Deserialize, Deserializer};

/// Deserialize a JSON `null` (or a missing field, with `#[serde(default)]`) as an empty list.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
