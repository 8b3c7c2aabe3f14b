use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::models::*;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Metadata
// ============================================================

pub async fn list_organizations(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.organizations())
}

pub async fn list_projects(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.projects.clone())
}

pub async fn list_teams(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.teams.clone())
}

#[derive(Deserialize)]
pub struct SprintParams {
    team: String,
}

pub async fn list_sprints(
    State(state): State<AppState>,
    Query(params): Query<SprintParams>,
) -> Json<Vec<Iteration>> {
    Json(state.catalog.sprints(&params.team))
}

pub async fn list_queries(State(state): State<AppState>) -> Json<Vec<QueryItem>> {
    Json(state.catalog.query_items())
}

// ============================================================
// Work Items
// ============================================================

pub async fn sprint_items(
    State(state): State<AppState>,
    Path((team, sprint)): Path<(String, String)>,
) -> Json<WorkItemResults> {
    Json(state.catalog.items_for_sprint(&team, &sprint))
}

pub async fn query_items(
    State(state): State<AppState>,
    Path((query_id, team)): Path<(String, String)>,
) -> Json<WorkItemResults> {
    Json(state.catalog.query_results(&query_id, &team))
}

// ============================================================
// Saved Maps
// ============================================================

pub async fn save_map(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<SavedLayout>), (StatusCode, String)> {
    if body.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Map is empty".to_string()));
    }
    let layout = state.db.save_layout(&body).map_err(internal_error)?;
    tracing::info!(version = layout.version, bytes = layout.bytes, "Map saved");
    Ok((StatusCode::CREATED, Json(layout)))
}

pub async fn list_maps(
    State(state): State<AppState>,
) -> Result<Json<Vec<SavedLayout>>, (StatusCode, String)> {
    state.db.list_layouts().map(Json).map_err(internal_error)
}

pub async fn latest_map(
    State(state): State<AppState>,
) -> Result<Json<SavedLayoutWithBlob>, (StatusCode, String)> {
    state
        .db
        .latest_layout()
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "No saved maps".to_string()))
}

pub async fn get_map(
    State(state): State<AppState>,
    Path(version): Path<i64>,
) -> Result<Json<SavedLayoutWithBlob>, (StatusCode, String)> {
    state
        .db
        .get_layout(version)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Map not found".to_string()))
}
