use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{require_caller_id, validate_limit};
use super::{ApiError, ApiResponse, AppState, HistoryEntryDto};
use crate::services::ProfileLookupService;

#[derive(Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    20
}

/// `GET /api/history?limit=N`
///
/// The calling user's lookups, newest first. Requires `X-Caller-Id`.
pub async fn list_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<HistoryEntryDto>>>, ApiError> {
    let caller = require_caller_id(&headers)?;
    let limit = validate_limit(query.limit)?;

    let entries = state
        .lookup()
        .history(caller, limit)
        .await?
        .into_iter()
        .map(HistoryEntryDto::from)
        .collect();

    Ok(Json(ApiResponse::success(entries)))
}
