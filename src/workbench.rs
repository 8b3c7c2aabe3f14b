//! Operator actions.
//!
//! The [`Workbench`] ties the data provider, the render host and the status board
//! together. Each data load runs one [`LayoutSession`] to completion before returning,
//! so layout passes never overlap.
//!
//! Host actions check availability first and only report to the status board when the
//! host is missing or a call fails. Provider failures are reported too, and returned.

use std::sync::Arc;

use thiserror::Error;

use crate::attributes::IterationLabels;
use crate::client::{ProviderClient, ProviderError};
use crate::config::LayoutConfig;
use crate::host::{HostLink, HostNode, HostUser, ListFilter, RenderHost};
use crate::models::{Iteration, QueryItem, WorkItemResults};
use crate::session::{Dataset, LayoutError, LayoutReport, LayoutSession};
use crate::status::StatusBoard;

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Selection lists offered to the operator.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub organizations: Vec<String>,
    pub projects: Vec<String>,
    pub teams: Vec<String>,
    pub queries: Vec<QueryItem>,
}

pub struct Workbench {
    provider: ProviderClient,
    host: Arc<dyn RenderHost>,
    config: LayoutConfig,
    status: StatusBoard,
    metadata: Metadata,
    iterations: Vec<Iteration>,
    user: Option<HostUser>,
    saved_map: Option<String>,
}

impl Workbench {
    pub fn new(provider: ProviderClient, host: Arc<dyn RenderHost>, config: LayoutConfig) -> Self {
        Self {
            provider,
            host,
            config,
            status: StatusBoard::new(),
            metadata: Metadata::default(),
            iterations: Vec::new(),
            user: None,
            saved_map: None,
        }
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn iterations(&self) -> &[Iteration] {
        &self.iterations
    }

    pub fn user(&self) -> Option<&HostUser> {
        self.user.as_ref()
    }

    /// The map text kept by the last successful save.
    pub fn saved_map(&self) -> Option<&str> {
        self.saved_map.as_deref()
    }

    fn host_ready(&mut self) -> bool {
        if self.host.is_installed() {
            return true;
        }
        self.status.error("Render host is not running");
        false
    }

    fn provider_failed<T>(&mut self, what: &str, e: ProviderError) -> Result<T, ProviderError> {
        self.status.error(format!("{} failed: {}", what, e));
        Err(e)
    }

    // ============================================================
    // Metadata
    // ============================================================

    pub async fn populate_user(&mut self) -> Option<&HostUser> {
        if !self.host_ready() {
            return None;
        }
        match self.host.get_user().await {
            Ok(user) => {
                self.status.success(format!("Host user: {}", user.user_id));
                self.user = Some(user);
            }
            Err(e) => self.status.error(format!("Get User error: {}", e)),
        }
        self.user.as_ref()
    }

    /// Fetch organization, project, team and query lists.
    pub async fn refresh_metadata(&mut self) -> Result<&Metadata, ProviderError> {
        let fetched = async {
            Ok::<_, ProviderError>(Metadata {
                organizations: self.provider.organizations().await?,
                projects: self.provider.projects().await?,
                teams: self.provider.teams().await?,
                queries: self.provider.queries().await?,
            })
        }
        .await;

        match fetched {
            Ok(metadata) => {
                self.status.event(format!(
                    "Loaded {} teams and {} queries",
                    metadata.teams.len(),
                    metadata.queries.len()
                ));
                self.metadata = metadata;
                Ok(&self.metadata)
            }
            Err(e) => self.provider_failed("Metadata request", e),
        }
    }

    /// Load the team's iterations; they back the sprint choices and link labels.
    pub async fn select_team(&mut self, team: &str) -> Result<&[Iteration], ProviderError> {
        match self.provider.sprints(team).await {
            Ok(iterations) => {
                self.status
                    .event(format!("Loaded {} sprints for {}", iterations.len(), team));
                self.iterations = iterations;
                Ok(&self.iterations)
            }
            Err(e) => self.provider_failed("Sprint request", e),
        }
    }

    // ============================================================
    // Data loads
    // ============================================================

    pub async fn fetch_sprint(&mut self, team: &str, sprint: &str) -> Result<Dataset, ProviderError> {
        self.status.clear_events();
        self.status.event(format!("Fetching {} / {}", team, sprint));
        match self.provider.items_by_sprint(team, sprint).await {
            Ok(results) => Ok(self.dataset(results)),
            Err(e) => self.provider_failed("Work item request", e),
        }
    }

    pub async fn fetch_query(&mut self, query_id: &str, team: &str) -> Result<Dataset, ProviderError> {
        self.status.clear_events();
        self.status.event(format!("Fetching query {} for {}", query_id, team));
        match self.provider.query_results(query_id, team).await {
            Ok(results) => Ok(self.dataset(results)),
            Err(e) => self.provider_failed("Query request", e),
        }
    }

    fn dataset(&mut self, results: WorkItemResults) -> Dataset {
        self.status.event(format!(
            "Received {} work items in {} trees",
            results.work_items.len(),
            results.work_paths.len()
        ));
        Dataset::new(results)
    }

    /// Load a sprint and lay it out. `Ok(None)` when the host is not available.
    pub async fn load_by_sprint(
        &mut self,
        team: &str,
        sprint: &str,
    ) -> Result<Option<LayoutReport>, WorkbenchError> {
        if !self.host_ready() {
            return Ok(None);
        }
        let dataset = self.fetch_sprint(team, sprint).await?;
        self.lay_out(dataset).await.map(Some)
    }

    /// Run a saved query and lay out its results. `Ok(None)` when the host is not available.
    pub async fn load_by_query(
        &mut self,
        query_id: &str,
        team: &str,
    ) -> Result<Option<LayoutReport>, WorkbenchError> {
        if !self.host_ready() {
            return Ok(None);
        }
        let dataset = self.fetch_query(query_id, team).await?;
        self.lay_out(dataset).await.map(Some)
    }

    async fn lay_out(&mut self, dataset: Dataset) -> Result<LayoutReport, WorkbenchError> {
        let labels = IterationLabels::with_catalog(self.config.iteration_labels, &self.iterations);
        let mut session = LayoutSession::with_labels(self.host.clone(), dataset, self.config, labels);

        match session.run(&mut self.status).await {
            Ok(report) => {
                if report.is_clean() {
                    self.status.success(format!(
                        "Map built: {} nodes, {} links",
                        report.nodes_created + report.nodes_updated,
                        report.links_created
                    ));
                }
                Ok(report)
            }
            Err(e) => {
                self.status.error(format!("Layout aborted: {}", e));
                Err(e.into())
            }
        }
    }

    // ============================================================
    // Saved maps
    // ============================================================

    /// Serialize the host map, keep the text and post it to the provider.
    ///
    /// Returns the map text, or `None` when the host could not produce it.
    pub async fn save_map(&mut self) -> Result<Option<String>, ProviderError> {
        if !self.host_ready() {
            return Ok(None);
        }
        let json = match self.host.save_json().await {
            Ok(json) => json,
            Err(e) => {
                self.status.error(format!("Save Map error: {}", e));
                return Ok(None);
            }
        };
        self.saved_map = Some(json.clone());

        if let Err(e) = self.provider.post_map(&json).await {
            return self.provider_failed("Map upload", e);
        }
        self.status.success("Map saved");
        Ok(Some(json))
    }

    /// Replace the host map with `json`, or with the last saved map when `None`.
    pub async fn load_map(&mut self, json: Option<&str>) -> bool {
        if !self.host_ready() {
            return false;
        }
        let Some(json) = json.map(str::to_string).or_else(|| self.saved_map.clone()) else {
            self.status.error("No saved map to load");
            return false;
        };
        match self.host.load_json(&json).await {
            Ok(()) => {
                self.status.success("Map loaded");
                true
            }
            Err(e) => {
                self.status.error(format!("Load Map error: {}", e));
                false
            }
        }
    }

    pub async fn clear_map(&mut self) -> bool {
        if !self.host_ready() {
            return false;
        }
        match self.host.clear_map().await {
            Ok(()) => {
                self.status.success("Map cleared");
                true
            }
            Err(e) => {
                self.status.error(format!("Clear Map error: {}", e));
                false
            }
        }
    }

    // ============================================================
    // Host inspection
    // ============================================================

    pub async fn list_nodes(&mut self) -> Vec<HostNode> {
        self.nodes(ListFilter::all()).await
    }

    pub async fn get_node(&mut self, uuid: &str) -> Option<HostNode> {
        self.nodes(ListFilter::by_uuid(uuid)).await.into_iter().next()
    }

    pub async fn list_links(&mut self) -> Vec<HostLink> {
        self.links(ListFilter::all()).await
    }

    pub async fn get_link(&mut self, uuid: &str) -> Option<HostLink> {
        self.links(ListFilter::by_uuid(uuid)).await.into_iter().next()
    }

    async fn nodes(&mut self, filter: ListFilter) -> Vec<HostNode> {
        if !self.host_ready() {
            return Vec::new();
        }
        match self.host.list_nodes(&filter).await {
            Ok(nodes) => nodes,
            Err(e) => {
                self.status.error(format!("List Nodes error: {}", e));
                Vec::new()
            }
        }
    }

    async fn links(&mut self, filter: ListFilter) -> Vec<HostLink> {
        if !self.host_ready() {
            return Vec::new();
        }
        match self.host.list_links(&filter).await {
            Ok(links) => links,
            Err(e) => {
                self.status.error(format!("List Links error: {}", e));
                Vec::new()
            }
        }
    }
}
