use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    catalog::Catalog,
    config::Config,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{FeedbackStore, SimilarityEngine},
};

pub mod anime;
pub mod feedback;
pub mod recommendations;

/// Shared, read-only application state built once at startup
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub engine: SimilarityEngine,
    pub feedback_store: Arc<dyn FeedbackStore>,
    pub config: Config,
}

impl AppState {
    /// Builds the similarity engine over `catalog` and wires the store
    pub fn new(catalog: Catalog, feedback_store: Arc<dyn FeedbackStore>, config: Config) -> Self {
        let catalog = Arc::new(catalog);
        let engine = SimilarityEngine::build(catalog.clone());
        Self {
            catalog,
            engine,
            feedback_store,
            config,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(anime::genres))
        .route("/anime/top", get(anime::top_rated))
        .route("/anime/:title", get(anime::get_anime))
        .route("/recommendations", get(recommendations::recommend))
        .route(
            "/feedback",
            get(feedback::list_feedback).post(feedback::submit_feedback),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
