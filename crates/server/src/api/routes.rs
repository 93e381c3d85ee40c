use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{audit, convert, handlers};
use crate::metrics;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let storage_dir = state.namer().storage_dir().to_path_buf();
    let body_limit = state.config().server.body_limit_bytes;

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/formats", get(handlers::list_formats))
        .route("/audit", get(audit::query_audit));

    Router::new()
        .route("/convert", post(convert::convert))
        .nest("/api/v1", api_routes)
        .route("/metrics", get(|| async { metrics::render() }))
        .nest_service("/download", ServeDir::new(storage_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
