//! Layout forest construction.
//!
//! Turns a flat work item list into root trees, then pads every short branch with
//! placeholder nodes so each root's leaves all sit on the same level. Padding keeps
//! parents centred over a stable footprint when sibling subtrees differ in depth.

use std::collections::{HashMap, HashSet};

use crate::models::{PathNode, WorkItem, WorkItemResults};

/// Build the padded layout forest for `items`.
///
/// Roots are the items no other item lists as a child, in input order. Children that
/// are not part of `items` are left out, and a child already on the current path is not
/// expanded again.
pub fn build_forest(items: &[WorkItem]) -> Vec<PathNode> {
    let by_id: HashMap<&str, &WorkItem> = items.iter().map(|i| (i.id.as_str(), i)).collect();
    let referenced: HashSet<&str> = items
        .iter()
        .flat_map(|i| i.children.iter().map(String::as_str))
        .collect();

    items
        .iter()
        .filter(|item| !referenced.contains(item.id.as_str()))
        .map(|root| {
            let mut path = Vec::new();
            let mut tree = expand(root, None, 0, &by_id, &mut path);
            let depth = max_level(&tree);
            pad(&mut tree, depth);
            tree
        })
        .collect()
}

/// Bundle items with their forest, as the provider answers a load request.
pub fn build_results(items: Vec<WorkItem>) -> WorkItemResults {
    let work_paths = build_forest(&items);
    WorkItemResults {
        work_items: items,
        work_paths,
    }
}

fn expand<'a>(
    item: &'a WorkItem,
    parent: Option<&str>,
    level: u32,
    by_id: &HashMap<&'a str, &'a WorkItem>,
    path: &mut Vec<&'a str>,
) -> PathNode {
    path.push(item.id.as_str());

    let mut children = Vec::new();
    for child_id in &item.children {
        let Some(&child) = by_id.get(child_id.as_str()) else {
            continue;
        };
        if path.contains(&child.id.as_str()) {
            tracing::warn!(parent = %item.id, child = %child.id, "Cycle in work item hierarchy");
            continue;
        }
        children.push(expand(child, Some(item.id.as_str()), level + 1, by_id, path));
    }

    path.pop();

    PathNode {
        external_id: item.id.clone(),
        parent_id: parent.map(str::to_string),
        level,
        children,
    }
}

fn max_level(node: &PathNode) -> u32 {
    node.children
        .iter()
        .map(max_level)
        .max()
        .unwrap_or(node.level)
        .max(node.level)
}

fn pad(node: &mut PathNode, target: u32) {
    if node.children.is_empty() {
        if node.level < target {
            node.children
                .push(placeholder_chain(&node.external_id, node.level + 1, target));
        }
        return;
    }
    for child in &mut node.children {
        pad(child, target);
    }
}

/// Placeholders from `level` down to `target`, each naming `leaf_id` as its parent.
fn placeholder_chain(leaf_id: &str, level: u32, target: u32) -> PathNode {
    let mut node = PathNode::placeholder(leaf_id, level);
    if level < target {
        node.children
            .push(placeholder_chain(leaf_id, level + 1, target));
    }
    node
}
