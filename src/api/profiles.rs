use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::validation::{caller_id, validate_insight_kind};
use super::{ApiError, ApiResponse, AppState, ProfileDto};
use crate::domain::Username;
use crate::services::ProfileLookupService;

#[derive(Deserialize)]
pub struct RegenerateQuery {
    pub kind: Option<String>,
}

/// `GET /api/profiles/{username}`
///
/// Refreshes whatever is stale and returns the profile view. AI sections that
/// could not be generated are reported in `pending`.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let username = Username::parse(&username)?;
    let record = state.lookup().ensure_profile_ready(&username).await?;

    if let Some(caller) = caller_id(&headers)
        && let Err(e) = state.lookup().record_search(caller, &record).await
    {
        warn!(username = %username, error = %e, "Failed to record search history");
    }

    Ok(Json(ApiResponse::success(ProfileDto::from(&record))))
}

/// `POST /api/profiles/{username}/regenerate?kind=insights|strategy|personas|all`
pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<RegenerateQuery>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let username = Username::parse(&username)?;
    let kind = validate_insight_kind(query.kind.as_deref())?;

    let record = state.lookup().regenerate(&username, kind).await?;

    Ok(Json(ApiResponse::success(ProfileDto::from(&record))))
}
