use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_chat_message;
use super::{ApiError, ApiResponse, AppState, ChatReplyDto};
use crate::domain::Username;
use crate::services::ProfileLookupService;

#[derive(Deserialize)]
pub struct ChatMessageRequest {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub persona_id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessageRequest>,
}

/// `POST /api/profiles/{username}/chat`
///
/// Continues a practice conversation with one of the profile's personas.
/// Never fetches; the profile must have been looked up before.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReplyDto>>, ApiError> {
    let username = Username::parse(&username)?;

    let persona_id = request.persona_id.trim();
    if persona_id.is_empty() {
        return Err(ApiError::validation("persona_id cannot be empty"));
    }

    let messages = request
        .messages
        .into_iter()
        .map(|m| validate_chat_message(&m.role, m.content))
        .collect::<Result<Vec<_>, _>>()?;

    let reply = state
        .lookup()
        .chat(&username, persona_id, messages)
        .await?;

    Ok(Json(ApiResponse::success(ChatReplyDto { reply })))
}
