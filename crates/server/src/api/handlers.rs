use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use morpho_core::{SanitizedConfig, TargetFormat};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

#[derive(Serialize)]
pub struct FormatsResponse {
    pub formats: &'static [&'static str],
}

/// GET /api/v1/formats
///
/// The closed set of target tokens the service dispatches on.
pub async fn list_formats() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: TargetFormat::TOKENS,
    })
}
