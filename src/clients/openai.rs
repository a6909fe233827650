use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use super::LlmClient;
use super::search_api::truncate_body;
use crate::config::LlmConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Chat completion request failed: {0}")]
    Transport(String),

    #[error("Chat completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Chat completion response could not be parsed: {0}")]
    Envelope(String),

    #[error("Chat completion returned no content")]
    EmptyContent,

    #[error("Chat completion content is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Generated document does not match the expected schema: {0}")]
    Schema(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Strips a Markdown code fence some models wrap around JSON output.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses the `content` of a JSON-mode completion.
pub fn parse_json_content(content: &str) -> Result<Value, LlmError> {
    serde_json::from_str(strip_code_fence(content)).map_err(|e| LlmError::InvalidJson(e.to_string()))
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Glimpse/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build chat completion client: {e}"))?;

        if config.api_key.is_empty() {
            warn!("LLM API key is not configured; insight generation will fail");
        }

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn send(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        json_mode: bool,
    ) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let start = Instant::now();
        let result = self.send_request(&request).await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "upstream_requests_total",
            "service" => "chat_completion",
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("upstream_request_duration_seconds", "service" => "chat_completion")
            .record(start.elapsed().as_secs_f64());

        debug!(
            model = %self.model,
            json_mode,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Chat completion finished"
        );

        result
    }

    async fn send_request(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let envelope: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Envelope(e.to_string()))?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<Value, LlmError> {
        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)];
        let content = self.send(&messages, temperature, true).await?;
        parse_json_content(&content)
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.send(messages, temperature, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serialization() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hi")];
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.5,
            response_format: Some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["response_format"]["type"], "json_object");

        let plain = ChatRequest {
            response_format: None,
            ..request
        };
        let value = serde_json::to_value(&plain).unwrap();
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn json_content_parsing() {
        assert_eq!(parse_json_content(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert_eq!(
            parse_json_content("```json\n{\"a\": 2}\n```").unwrap(),
            json!({"a": 2})
        );
        assert!(matches!(
            parse_json_content("not json"),
            Err(LlmError::InvalidJson(_))
        ));
    }
}
