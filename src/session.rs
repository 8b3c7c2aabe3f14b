//! Layout sessions.
//!
//! A [`LayoutSession`] owns everything one refresh cycle needs: the loaded [`Dataset`],
//! a fresh [`IdentityRegistry`] and the placement settings. Running it places every
//! work item on the host, bottom-up, then rebuilds all parent/child links from scratch.
//! The session is dropped once the pass completes.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::attributes::{link_style, map_color, map_shape, IterationLabels};
use crate::config::LayoutConfig;
use crate::host::{ListFilter, LinkProps, Location, NodeProps, RelativeTo, RenderHost};
use crate::identity::IdentityRegistry;
use crate::layout::{calc_x_position, ChildPositions, LevelMatrix};
use crate::models::{PathEntry, PathNode, WorkItem, WorkItemResults};
use crate::status::StatusBoard;

/// Layout pass errors. Host call failures are not errors; they are counted in the
/// [`LayoutReport`] and the pass carries on.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("work item {id} at depth {depth} is missing from the loaded data")]
    MissingWorkItem { id: String, depth: usize },
}

/// The work items and layout forest of one data load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    items: Vec<WorkItem>,
    index: HashMap<String, usize>,
    forest: Vec<PathNode>,
}

impl Dataset {
    /// Index the results by work item id. When an id repeats, the last item wins.
    pub fn new(results: WorkItemResults) -> Self {
        let index = results
            .work_items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        Self {
            items: results.work_items,
            index,
            forest: results.work_paths,
        }
    }

    pub fn get(&self, id: &str) -> Option<&WorkItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn forest(&self) -> &[PathNode] {
        &self.forest
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What a layout pass did.
#[derive(Debug, Clone, Default)]
pub struct LayoutReport {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub placeholders: usize,
    pub links_deleted: usize,
    pub links_created: usize,
    pub links_skipped: usize,
    /// Host calls that failed, in the order they happened.
    pub failures: Vec<String>,
    /// Final placement per work item id.
    pub positions: HashMap<String, Location>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct LayoutSession {
    host: Arc<dyn RenderHost>,
    dataset: Dataset,
    config: LayoutConfig,
    labels: IterationLabels,
    registry: IdentityRegistry,
}

impl LayoutSession {
    pub fn new(host: Arc<dyn RenderHost>, dataset: Dataset, config: LayoutConfig) -> Self {
        let labels = IterationLabels::new(config.iteration_labels);
        Self::with_labels(host, dataset, config, labels)
    }

    pub fn with_labels(
        host: Arc<dyn RenderHost>,
        dataset: Dataset,
        config: LayoutConfig,
        labels: IterationLabels,
    ) -> Self {
        Self {
            host,
            dataset,
            config,
            labels,
            registry: IdentityRegistry::new(),
        }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Run one full layout pass.
    ///
    /// Fails only when the forest names a work item the dataset does not contain; the
    /// positions of every ancestor depend on it, so the pass stops there.
    pub async fn run(&mut self, status: &mut StatusBoard) -> Result<LayoutReport, LayoutError> {
        let mut report = LayoutReport::default();
        status.event("Processing results.");

        self.refresh_identities(status, &mut report).await;
        self.place_nodes(status, &mut report).await?;
        self.rebuild_links(status, &mut report).await;

        tracing::info!(
            created = report.nodes_created,
            updated = report.nodes_updated,
            placeholders = report.placeholders,
            links = report.links_created,
            failures = report.failures.len(),
            "Layout pass finished"
        );
        Ok(report)
    }

    /// Re-read every node on the host so existing nodes are updated instead of duplicated.
    pub async fn refresh_identities(&mut self, status: &mut StatusBoard, report: &mut LayoutReport) {
        match self.host.list_nodes(&ListFilter::all()).await {
            Ok(nodes) => {
                for node in &nodes {
                    if let Some(external_id) = node.notes.as_deref().filter(|n| !n.is_empty()) {
                        self.registry.record(external_id, node.uuid.as_str());
                    }
                }
                status.event(format!("Refreshed current graph node map : {}", nodes.len()));
            }
            Err(e) => fail(status, report, format!("List Nodes error: {}", e)),
        }
    }

    async fn place_nodes(
        &mut self,
        status: &mut StatusBoard,
        report: &mut LayoutReport,
    ) -> Result<(), LayoutError> {
        let matrix = LevelMatrix::build(self.dataset.forest());
        let mut positions = ChildPositions::new();
        status.event("Drawing nodes.");

        for (depth, level) in matrix.bottom_up() {
            let width = level.len();
            for (column, entry) in level.iter().enumerate() {
                match entry {
                    PathEntry::Placeholder { parent } => {
                        // Pads below already recorded against the leaf, so a chain stays in one column.
                        let x = calc_x_position(
                            positions.get(parent),
                            width,
                            column,
                            self.config.x_spacing,
                        );
                        positions.record(Some(parent.as_str()), x);
                        report.placeholders += 1;
                    }
                    PathEntry::Real(id) => {
                        let item = self.dataset.get(id).ok_or_else(|| {
                            LayoutError::MissingWorkItem {
                                id: id.clone(),
                                depth,
                            }
                        })?;
                        let x = calc_x_position(
                            positions.get(id),
                            width,
                            column,
                            self.config.x_spacing,
                        );
                        let props = self.node_props(item, x, depth);
                        let parent = item.parent.clone();

                        report.positions.insert(id.clone(), props.location);
                        self.upsert_node(props, status, report).await;
                        positions.record(parent.as_deref(), x);
                    }
                }
            }
        }
        Ok(())
    }

    fn node_props(&self, item: &WorkItem, x: f64, depth: usize) -> NodeProps {
        NodeProps {
            uuid: None,
            title: item.name.clone(),
            color: map_color(item.kind, item.state),
            opacity: 1.0,
            shape: map_shape(item.kind),
            image_url: String::new(),
            notes: item.id.clone(),
            page_url: item.remote_ref.clone(),
            size: self.config.node_size,
            location: Location {
                x,
                y: -(depth as f64 * self.config.y_spacing),
                z: -self.config.z_offset,
                relative_to: RelativeTo::Origin,
            },
            selected: false,
            collapsed: false,
        }
    }

    /// Update the node when the registry knows it, otherwise create it.
    ///
    /// The registry was refreshed from the host at the start of the pass, so it is the
    /// existence check; an update that the host rejects is reported like any other failure.
    async fn upsert_node(
        &mut self,
        mut props: NodeProps,
        status: &mut StatusBoard,
        report: &mut LayoutReport,
    ) {
        props.uuid = self.registry.visual_id(&props.notes).map(str::to_string);
        let exists = props.uuid.is_some();

        let result = if exists {
            self.host.update_node(&props).await
        } else {
            self.host.create_node(&props).await
        };

        match result {
            Ok(uuid) => {
                if exists {
                    report.nodes_updated += 1;
                } else {
                    report.nodes_created += 1;
                }
                self.registry.record(props.notes, uuid);
            }
            Err(e) if exists => fail(status, report, format!("Node update error: {}", e)),
            Err(e) => fail(status, report, format!("Node create error: {}", e)),
        }
    }

    /// Delete every link on the host, then create one per parent/child pair.
    ///
    /// The provider never reports removed relations, so the purge is unconditional.
    pub async fn rebuild_links(&mut self, status: &mut StatusBoard, report: &mut LayoutReport) {
        status.event("Drawing node relationships.");

        let existing = match self.host.list_links(&ListFilter::all()).await {
            Ok(links) => links,
            Err(e) => {
                fail(status, report, format!("List Links error: {}", e));
                return;
            }
        };

        for link in existing {
            match self.host.delete_link(&link.uuid).await {
                Ok(()) => report.links_deleted += 1,
                Err(e) => fail(status, report, format!("Link delete error: {}", e)),
            }
        }

        for parent in self.dataset.items() {
            for child_id in &parent.children {
                let Some(props) = self.link_props(parent, child_id, status) else {
                    report.links_skipped += 1;
                    continue;
                };
                match self.host.create_link(&props).await {
                    Ok(()) => report.links_created += 1,
                    Err(e) => fail(status, report, format!("Link create error: {}", e)),
                }
            }
        }
    }

    fn link_props(&self, parent: &WorkItem, child_id: &str, status: &mut StatusBoard) -> Option<LinkProps> {
        let Some(child) = self.dataset.get(child_id) else {
            status.event(format!(
                "Skipping link {} -> {}: child not in loaded data",
                parent.id, child_id
            ));
            return None;
        };

        let (Some(from), Some(to)) = (
            self.registry.visual_id(&parent.id),
            self.registry.visual_id(child_id),
        ) else {
            status.event(format!(
                "Skipping link {} -> {}: node not placed",
                parent.id, child_id
            ));
            return None;
        };

        let style = link_style(child);
        Some(LinkProps {
            uuid: None,
            from_uuid: from.to_string(),
            to_uuid: to.to_string(),
            title: self.labels.label(child.iteration.as_deref()),
            color: style.color,
            shape: style.shape,
            trail: style.trail,
            size: style.size,
            selected: false,
        })
    }
}

fn fail(status: &mut StatusBoard, report: &mut LayoutReport, message: String) {
    status.error(message.clone());
    report.failures.push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{WorkItemState, WorkItemType};

    fn item(id: &str, parent: Option<&str>, children: &[&str]) -> WorkItem {
        WorkItem {
            id: id.to_string(),
            parent: parent.map(str::to_string),
            name: format!("Item {}", id),
            kind: WorkItemType::Story,
            state: WorkItemState::Backlog,
            iteration: None,
            remote_ref: None,
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn dataset_indexes_items_by_id() {
        let dataset = Dataset::new(WorkItemResults {
            work_items: vec![item("1", None, &["2"]), item("2", Some("1"), &[])],
            work_paths: vec![],
        });
        assert_eq!(dataset.get("2").map(|i| i.name.as_str()), Some("Item 2"));
        assert!(dataset.get("3").is_none());
    }

    #[test]
    fn node_props_place_deeper_levels_lower() {
        let session = LayoutSession::new(
            Arc::new(crate::host::UnavailableHost),
            Dataset::default(),
            LayoutConfig::default(),
        );
        let props = session.node_props(&item("5", None, &[]), 0.6, 2);
        assert_eq!(props.location.x, 0.6);
        assert!((props.location.y + 0.84).abs() < 1e-9);
        assert_eq!(props.location.z, -0.3);
        assert_eq!(props.notes, "5");
        assert_eq!(props.size, 7.0);
    }
}
