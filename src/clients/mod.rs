//! Outbound HTTP clients.
//!
//! The lookup pipeline only sees the [`ProfileFetcher`] and [`LlmClient`]
//! traits so that tests can substitute counting fakes for the network.

pub mod openai;
pub mod search_api;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::Username;
use crate::models::ProfileSnapshot;

pub use openai::{ChatMessage, ChatRole, LlmError, OpenAiClient};
pub use search_api::{FetchError, SearchApiClient};

/// Source of raw profile snapshots.
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetches and normalizes one profile. A single attempt, no retries.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, a non-success status, or
    /// a body that is not a JSON object.
    async fn fetch(&self, username: &Username) -> Result<ProfileSnapshot, FetchError>;
}

/// Chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Requests a JSON object response and parses the message content.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the call fails, the envelope cannot be read,
    /// or the content is not JSON.
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<Value, LlmError>;

    /// Free-form completion over a full conversation.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] when the call fails or yields no content.
    async fn complete(&self, messages: &[ChatMessage], temperature: f32)
    -> Result<String, LlmError>;
}
