use axum::http::HeaderMap;

use super::ApiError;
use crate::clients::{ChatMessage, ChatRole};
use crate::domain::InsightKind;

/// Opaque caller identity set by the fronting web layer.
pub const CALLER_ID_HEADER: &str = "x-caller-id";

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 100;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, MAX_LIMIT
        )));
    }
    Ok(limit)
}

pub fn caller_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(CALLER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

pub fn require_caller_id(headers: &HeaderMap) -> Result<&str, ApiError> {
    caller_id(headers).ok_or_else(|| {
        ApiError::validation(format!("Missing {CALLER_ID_HEADER} header"))
    })
}

/// `None` selects every generator.
pub fn validate_insight_kind(kind: Option<&str>) -> Result<Option<InsightKind>, ApiError> {
    match kind.map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(name) => InsightKind::from_name(name).map(Some).ok_or_else(|| {
            ApiError::validation(format!(
                "Invalid kind: {name}. Use insights, strategy, personas or all"
            ))
        }),
    }
}

pub fn validate_chat_message(role: &str, content: String) -> Result<ChatMessage, ApiError> {
    let role = match role.trim().to_ascii_lowercase().as_str() {
        "user" => ChatRole::User,
        "assistant" => ChatRole::Assistant,
        other => {
            return Err(ApiError::validation(format!(
                "Invalid message role: {other}. Use user or assistant"
            )));
        }
    };
    Ok(ChatMessage { role, content })
}
