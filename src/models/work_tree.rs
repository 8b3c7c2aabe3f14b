use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::null_as_empty;

/// Marker that starts every placeholder id, e.g. `P20124-L3`.
pub const PLACEHOLDER_MARKER: char = 'P';

static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P(\d+)-").expect("placeholder pattern is valid"));

/// A node of the layout forest.
///
/// The forest mirrors the work item hierarchy, padded with placeholder nodes so that
/// every branch of a root reaches the same depth. It lives for a single layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNode {
    pub external_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Depth in the hierarchy tree, root = 0.
    #[serde(default)]
    pub level: u32,
    /// `null` and a missing field both mean "no children".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<PathNode>,
}

impl PathNode {
    pub fn new(external_id: impl Into<String>, children: Vec<PathNode>) -> Self {
        Self {
            external_id: external_id.into(),
            parent_id: None,
            level: 0,
            children,
        }
    }

    /// Build a placeholder node reserving space under `parent_ref` at `level`.
    pub fn placeholder(parent_ref: &str, level: u32) -> Self {
        Self {
            external_id: format!("{PLACEHOLDER_MARKER}{parent_ref}-L{level}"),
            parent_id: Some(parent_ref.to_string()),
            level,
            children: Vec::new(),
        }
    }

    pub fn entry(&self) -> PathEntry {
        PathEntry::parse(&self.external_id)
    }
}

/// A decoded layout forest identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathEntry {
    /// A work item that is drawn as a node.
    Real(String),
    /// Reserved space under the referenced parent; never drawn.
    Placeholder { parent: String },
}

impl PathEntry {
    /// Decode an external id. Ids of the form `P<digits>-...` are placeholders; anything
    /// else, including other ids starting with `P`, is a real work item id.
    pub fn parse(id: &str) -> Self {
        match PLACEHOLDER_PATTERN.captures(id) {
            Some(caps) => Self::Placeholder {
                parent: caps[1].to_string(),
            },
            None => Self::Real(id.to_string()),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(id) => f.write_str(id),
            Self::Placeholder { parent } => write!(f, "{PLACEHOLDER_MARKER}{parent}-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_placeholder_parent_reference() {
        assert_eq!(
            PathEntry::parse("P20124-L3"),
            PathEntry::Placeholder {
                parent: "20124".to_string()
            }
        );
    }

    #[test]
    fn plain_ids_are_real() {
        assert_eq!(PathEntry::parse("20124"), PathEntry::Real("20124".to_string()));
    }

    #[test]
    fn p_prefix_without_pattern_is_real() {
        assert_eq!(PathEntry::parse("Pending"), PathEntry::Real("Pending".to_string()));
        assert_eq!(PathEntry::parse("P12"), PathEntry::Real("P12".to_string()));
    }

    #[test]
    fn placeholder_constructor_round_trips_through_parse() {
        let node = PathNode::placeholder("7", 2);
        assert_eq!(node.external_id, "P7-L2");
        assert_eq!(
            node.entry(),
            PathEntry::Placeholder {
                parent: "7".to_string()
            }
        );
    }

    #[test]
    fn null_children_deserialize_as_empty() {
        let node: PathNode =
            serde_json::from_str(r#"{"externalId": "1", "parentId": null, "level": 0, "children": null}"#)
                .unwrap();
        assert!(node.children.is_empty());

        let node: PathNode = serde_json::from_str(r#"{"externalId": "1"}"#).unwrap();
        assert!(node.children.is_empty());
    }
}
