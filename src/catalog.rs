//! Fixture catalog served by the local data provider.
//!
//! A catalog is a JSON document holding work items the way the upstream tracker reports
//! them (type and state names, iteration paths, relation URLs) plus the organization,
//! project, team, iteration and saved query metadata around them. It is converted into
//! provider payloads on request.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::forest::build_results;
use crate::models::{Iteration, QueryItem, WorkItem, WorkItemResults, WorkItemState, WorkItemType};

const SAMPLE: &str = include_str!("../fixtures/catalog.json");

static TRAILING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\D*$").expect("trailing id pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub organization: String,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    /// Iterations keyed by team name.
    #[serde(default)]
    pub iterations: HashMap<String, Vec<Iteration>>,
    #[serde(default)]
    pub queries: Vec<SavedQuery>,
    #[serde(default)]
    pub items: Vec<RawWorkItem>,
}

/// A saved query and the ids of the items it returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuery {
    pub uuid: String,
    pub path: String,
    #[serde(default)]
    pub wiql: Option<String>,
    #[serde(default)]
    pub items: Vec<u64>,
}

/// A work item in tracker terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWorkItem {
    pub id: u64,
    pub title: String,
    /// Tracker type name, e.g. `User Story`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Tracker state name, e.g. `Active`.
    pub state: String,
    pub project: String,
    /// `Project\Sprint` style path.
    #[serde(default)]
    pub iteration_path: String,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// `Parent` or `Child`; other names are ignored.
    pub name: String,
    pub url: String,
}

impl Catalog {
    /// The built-in demo catalog.
    pub fn sample() -> Result<Self> {
        Self::from_json(SAMPLE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse catalog")
    }

    pub fn organizations(&self) -> Vec<String> {
        vec![self.organization.clone()]
    }

    /// Iterations of `team`; unknown teams have none.
    pub fn sprints(&self, team: &str) -> Vec<Iteration> {
        self.iterations.get(team).cloned().unwrap_or_default()
    }

    pub fn query_items(&self) -> Vec<QueryItem> {
        self.queries
            .iter()
            .map(|q| QueryItem {
                uuid: q.uuid.clone(),
                path: q.path.clone(),
                wiql: q.wiql.clone(),
            })
            .collect()
    }

    /// Items planned for `sprint`, excluding removed ones, with their forest.
    pub fn items_for_sprint(&self, team: &str, sprint: &str) -> WorkItemResults {
        let items: Vec<WorkItem> = self
            .items
            .iter()
            .filter(|raw| iteration_name(&raw.iteration_path) == sprint)
            .map(|raw| self.convert(raw))
            .filter(|item| item.state != WorkItemState::Removed)
            .collect();
        tracing::debug!(team, sprint, count = items.len(), "Sprint items");
        build_results(items)
    }

    /// Items of the saved query `query_id` (matched case-insensitively).
    /// Unknown queries yield empty results.
    pub fn query_results(&self, query_id: &str, team: &str) -> WorkItemResults {
        let Some(query) = self
            .queries
            .iter()
            .find(|q| q.uuid.eq_ignore_ascii_case(query_id))
        else {
            tracing::debug!(query_id, "Unknown query");
            return WorkItemResults::default();
        };

        let items: Vec<WorkItem> = self
            .items
            .iter()
            .filter(|raw| query.items.contains(&raw.id))
            .map(|raw| self.convert(raw))
            .collect();
        tracing::debug!(query = %query.path, team, count = items.len(), "Query items");
        build_results(items)
    }

    fn convert(&self, raw: &RawWorkItem) -> WorkItem {
        let iteration = iteration_name(&raw.iteration_path);

        WorkItem {
            id: raw.id.to_string(),
            parent: related(raw, "Parent").last(),
            name: raw.title.clone(),
            kind: WorkItemType::from_provider_name(&raw.kind),
            state: WorkItemState::from_provider_name(&raw.state),
            iteration: Some(iteration.to_string()).filter(|i| !i.is_empty()),
            remote_ref: Some(remote_ref(&self.organization, &raw.project, raw.id)),
            children: related(raw, "Child").collect(),
        }
    }
}

/// Ids of the items `raw` links to through relations called `name`.
fn related<'a>(raw: &'a RawWorkItem, name: &'a str) -> impl Iterator<Item = String> + 'a {
    raw.relations
        .iter()
        .filter(move |r| r.name.eq_ignore_ascii_case(name))
        .filter_map(|r| relation_target_id(&r.url))
}

/// The sprint segment of an iteration path (`Project\Sprint 1` gives `Sprint 1`).
/// Paths without a separator give an empty name.
pub fn iteration_name(path: &str) -> &str {
    path.split('\\').nth(1).unwrap_or("")
}

/// The trailing number of a relation URL is the related item's id.
pub fn relation_target_id(url: &str) -> Option<String> {
    TRAILING_ID.captures(url).map(|caps| caps[1].to_string())
}

pub fn remote_ref(organization: &str, project: &str, id: u64) -> String {
    format!(
        "https://dev.azure.com/{}/{}/_workitems/edit/{}/",
        organization, project, id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_name_takes_second_segment() {
        assert_eq!(iteration_name(r"Mapping\Sprint 1"), "Sprint 1");
        assert_eq!(iteration_name(r"Mapping\Release 2\Sprint 4"), "Release 2");
        assert_eq!(iteration_name("Mapping"), "");
    }

    #[test]
    fn relation_ids_come_from_the_url_tail() {
        assert_eq!(
            relation_target_id("https://dev.azure.com/org/_apis/wit/workItems/20124"),
            Some("20124".to_string())
        );
        assert_eq!(
            relation_target_id("https://example.com/items/7/"),
            Some("7".to_string())
        );
        assert_eq!(relation_target_id("https://example.com/items"), None);
    }

    #[test]
    fn sample_catalog_converts_tracker_names() {
        let catalog = Catalog::sample().unwrap();
        let results = catalog.items_for_sprint("Core Team", "Sprint 1");
        assert!(!results.work_items.is_empty());

        let story = results
            .work_items
            .iter()
            .find(|i| i.kind == WorkItemType::Story)
            .unwrap();
        assert_eq!(story.iteration.as_deref(), Some("Sprint 1"));
        assert!(story
            .remote_ref
            .as_deref()
            .unwrap()
            .starts_with("https://dev.azure.com/"));
        assert!(story.parent.is_some());
    }

    #[test]
    fn sprint_results_exclude_removed_items() {
        let catalog = Catalog::sample().unwrap();
        let results = catalog.items_for_sprint("Core Team", "Sprint 1");
        assert!(results
            .work_items
            .iter()
            .all(|i| i.state != WorkItemState::Removed));
    }

    #[test]
    fn unknown_query_is_empty() {
        let catalog = Catalog::sample().unwrap();
        let results = catalog.query_results("no-such-query", "Core Team");
        assert!(results.work_items.is_empty());
        assert!(results.work_paths.is_empty());
    }
}
