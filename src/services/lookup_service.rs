//! Profile lookup use case.
//!
//! Ties the read-through profile cache to the insight generators and exposes
//! persona chat and per-caller search history on top of the cached record.

use async_trait::async_trait;
use thiserror::Error;

use super::generators::GenerationError;
use super::profile_cache::CacheError;
use crate::clients::{ChatMessage, FetchError, LlmError};
use crate::domain::{InsightKind, Username};
use crate::models::{ProfileRecord, SearchHistoryEntry};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Profile not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<CacheError> for LookupError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Fetch(e) => Self::Fetch(e),
            CacheError::Database(msg) => Self::Database(msg),
        }
    }
}

impl From<GenerationError> for LookupError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Database(msg) => Self::Database(msg),
        }
    }
}

impl From<anyhow::Error> for LookupError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Persona not found: {0}")]
    PersonaNotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[async_trait]
pub trait ProfileLookupService: Send + Sync {
    /// Returns a record whose snapshot is fresh, running whichever insight
    /// generators are due. Generator failures leave their field absent.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Fetch`] when a needed upstream fetch fails.
    async fn ensure_profile_ready(&self, username: &Username)
    -> Result<ProfileRecord, LookupError>;

    /// Regenerates one document, or all three when `kind` is `None`,
    /// regardless of freshness.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Fetch`] when the profile has to be fetched and
    /// that fails.
    async fn regenerate(
        &self,
        username: &Username,
        kind: Option<InsightKind>,
    ) -> Result<ProfileRecord, LookupError>;

    /// Reads the stored record without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::NotFound`] for an unseen username.
    async fn cached(&self, username: &Username) -> Result<ProfileRecord, LookupError>;

    /// Replies in character as one of the profile's generated personas.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError`] for unknown profiles or personas, an invalid
    /// conversation, or a failed completion.
    async fn chat(
        &self,
        username: &Username,
        persona_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ChatError>;

    /// Records that `caller_id` looked up `record`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Validation`] for a blank caller id.
    async fn record_search(&self, caller_id: &str, record: &ProfileRecord)
    -> Result<(), LookupError>;

    /// Lists a caller's lookups, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Validation`] for a blank caller id.
    async fn history(
        &self,
        caller_id: &str,
        limit: u64,
    ) -> Result<Vec<SearchHistoryEntry>, LookupError>;
}
