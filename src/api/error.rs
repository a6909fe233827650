use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::ApiResponse;
use crate::clients::{FetchError, LlmError};
use crate::domain::UsernameError;
use crate::services::{ChatError, LookupError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{service} error: {message}")]
    ExternalApiError { service: &'static str, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn profile_not_found(username: &str) -> Self {
        Self::NotFound(format!("Profile '{username}' not found"))
    }

    pub fn search_api_error(msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: "Profile search",
            message: msg.into(),
        }
    }

    pub fn llm_error(msg: impl Into<String>) -> Self {
        Self::ExternalApiError {
            service: "Chat completion",
            message: msg.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::ExternalApiError { .. } => StatusCode::BAD_GATEWAY,
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the response envelope. Upstream and storage details
    /// stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::NotFound(msg) | Self::ValidationError(msg) => msg.clone(),
            Self::ExternalApiError { service, .. } => format!("{service} service is unavailable"),
            Self::DatabaseError(_) => "A database error occurred".to_string(),
            Self::InternalError(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::ExternalApiError { .. } => tracing::warn!(error = %self, "Upstream call failed"),
            Self::DatabaseError(_) | Self::InternalError(_) => {
                tracing::error!(error = %self, "Request failed");
            }
            Self::NotFound(_) | Self::ValidationError(_) => {}
        }

        let body = ApiResponse::<()>::error(self.public_message());
        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(format!("{err:#}"))
    }
}

impl From<UsernameError> for ApiError {
    fn from(err: UsernameError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self::search_api_error(err.to_string())
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        Self::llm_error(err.to_string())
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(username) => Self::profile_not_found(&username),
            LookupError::Validation(msg) => Self::validation(msg),
            LookupError::Fetch(e) => e.into(),
            LookupError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::ProfileNotFound(username) => Self::profile_not_found(&username),
            ChatError::PersonaNotFound(id) => Self::not_found("Persona", format!("'{id}'")),
            ChatError::Validation(msg) => Self::validation(msg),
            ChatError::Llm(e) => e.into(),
            ChatError::Database(msg) => Self::DatabaseError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let err: ApiError = LookupError::Fetch(FetchError::Malformed("x".to_string())).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.public_message(), "Profile search service is unavailable");

        let err: ApiError = ChatError::PersonaNotFound("grumpy".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Persona 'grumpy' not found");

        let err: ApiError = UsernameError::Empty.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = LookupError::Database("disk I/O error".to_string()).into();
        assert_eq!(err.public_message(), "A database error occurred");
    }
}
