use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::handlers::{get_summary, health_check, list_emissions, list_projects, AppState};

pub fn create_api_router(state: AppState) -> Router {
    let state = Arc::new(state);

    let codecarbon_routes = Router::new()
        .route("/projects", get(list_projects))
        .route("/emissions", get(list_emissions))
        .route("/summary", get(get_summary))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/codecarbon", codecarbon_routes)
        .layer(CorsLayer::permissive())
}
