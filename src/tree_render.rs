//! ASCII tree rendering for loaded work item hierarchies.

use crate::models::{PathNode, WorkItemState};
use crate::session::Dataset;

const BACKLOG: char = '◇';
const IN_PROGRESS: char = '○';
const COMPLETED: char = '●';
const REMOVED: char = '✗';
const UNKNOWN: char = '?';

fn state_symbol(state: WorkItemState) -> char {
    match state {
        WorkItemState::Backlog => BACKLOG,
        WorkItemState::InProgress => IN_PROGRESS,
        WorkItemState::Completed => COMPLETED,
        WorkItemState::Removed => REMOVED,
        WorkItemState::Unknown => UNKNOWN,
    }
}

/// Render the dataset's forest as ASCII art with status symbols.
///
/// Placeholders are left out. Example output:
/// ```text
/// ◇ Spatial planning (EPIC 100)
/// ├── ○ Node layout (FEATURE 101)
/// │   ├── ● Centre parents over children (STORY 103)
/// │   └── ○ Duplicate nodes on refresh (BUG 105)
/// └── ◇ Link styling (FEATURE 102)
/// ```
pub fn render_tree(dataset: &Dataset) -> String {
    let mut output = String::new();
    for root in visible(dataset.forest()) {
        render_node(&mut output, dataset, root, "", true, true);
    }
    output
}

fn visible(nodes: &[PathNode]) -> impl Iterator<Item = &PathNode> {
    nodes.iter().filter(|n| !n.entry().is_placeholder())
}

fn label(dataset: &Dataset, node: &PathNode) -> String {
    match dataset.get(&node.external_id) {
        Some(item) => format!(
            "{} {} ({} {})",
            state_symbol(item.state),
            item.name,
            item.kind.as_str(),
            item.id
        ),
        None => format!("{} {}", UNKNOWN, node.external_id),
    }
}

fn render_node(
    output: &mut String,
    dataset: &Dataset,
    node: &PathNode,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    if !is_root {
        output.push_str(prefix);
        output.push_str(if is_last { "└── " } else { "├── " });
    }
    output.push_str(&label(dataset, node));
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    let children: Vec<&PathNode> = visible(&node.children).collect();
    for (i, child) in children.iter().enumerate() {
        let child_is_last = i == children.len() - 1;
        render_node(output, dataset, child, &child_prefix, child_is_last, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::build_results;
    use crate::models::{WorkItem, WorkItemType};

    fn item(id: &str, name: &str, state: WorkItemState, children: &[&str]) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            parent: None,
            name: name.to_string(),
            kind: WorkItemType::Feature,
            state,
            iteration: None,
            remote_ref: None,
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn single_root() {
        let dataset = Dataset::new(build_results(vec![item(
            "1",
            "Mapping",
            WorkItemState::Backlog,
            &[],
        )]));
        assert_eq!(render_tree(&dataset), "◇ Mapping (FEATURE 1)\n");
    }

    #[test]
    fn nested_children_skip_placeholders() {
        // "3" is padded with a placeholder to match the depth under "2".
        let dataset = Dataset::new(build_results(vec![
            item("1", "Root", WorkItemState::InProgress, &["2", "3"]),
            item("2", "Deep", WorkItemState::Completed, &["4"]),
            item("3", "Shallow", WorkItemState::Removed, &[]),
            item("4", "Leaf", WorkItemState::Backlog, &[]),
        ]));

        let expected = "○ Root (FEATURE 1)\n\
                        ├── ● Deep (FEATURE 2)\n\
                        │   └── ◇ Leaf (FEATURE 4)\n\
                        └── ✗ Shallow (FEATURE 3)\n";
        assert_eq!(render_tree(&dataset), expected);
    }

    #[test]
    fn empty_dataset_renders_nothing() {
        assert_eq!(render_tree(&Dataset::default()), "");
    }
}
