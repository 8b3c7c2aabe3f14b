mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::Catalog;
use crate::db::Database;

/// Shared state of the fixture provider.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub db: Database,
}

impl AppState {
    pub fn new(catalog: Catalog, db: Database) -> Self {
        Self {
            catalog: Arc::new(catalog),
            db,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Metadata
        .route("/organization", get(handlers::list_organizations))
        .route("/projects", get(handlers::list_projects))
        .route("/teams", get(handlers::list_teams))
        .route("/sprints", get(handlers::list_sprints))
        .route("/queries", get(handlers::list_queries))
        // Work items
        .route("/query/{query_id}/team/{team}", get(handlers::query_items))
        .route("/items/team/{team}/sprint/{sprint}", get(handlers::sprint_items))
        // Saved maps
        .route("/map", post(handlers::save_map))
        .route("/maps", get(handlers::list_maps))
        .route("/maps/latest", get(handlers::latest_map))
        .route("/maps/{version}", get(handlers::get_map))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/agile", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
