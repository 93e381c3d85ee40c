//! Conversion log query endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use morpho_core::{AuditFilter, AuditRecord};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditQueryResponse {
    pub events: Vec<AuditRecord>,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /api/v1/audit
pub async fn query_audit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditQueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut filter = AuditFilter::new().with_time_range(params.from, params.to);
    if let Some(request_id) = params.request_id {
        filter = filter.with_request_id(request_id);
    }
    if let Some(event_type) = params.event_type {
        filter = filter.with_event_type(event_type);
    }
    if let Some(limit) = params.limit {
        filter = filter.with_limit(limit.clamp(1, 1000));
    }
    if let Some(offset) = params.offset {
        filter = filter.with_offset(offset.max(0));
    }

    let store = state.audit_store();
    let events = store.query(&filter).map_err(internal_error)?;
    let total = store.count(&filter).map_err(internal_error)?;

    Ok(Json(AuditQueryResponse { events, total }))
}

fn internal_error(e: morpho_core::AuditError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!("Audit query failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Audit query failed".to_string(),
        }),
    )
}
