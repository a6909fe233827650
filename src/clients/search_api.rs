use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::ProfileFetcher;
use crate::config::SearchApiConfig;
use crate::domain::Username;
use crate::models::ProfileSnapshot;
use crate::parser::normalize_payload;

/// Upper bound on how much of an error body is kept in a [`FetchError`].
const ERROR_BODY_LIMIT: usize = 500;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Profile search request failed: {0}")]
    Transport(String),

    #[error("Profile search API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Profile search API returned a malformed body: {0}")]
    Malformed(String),

    #[error("Profile search API error: {0}")]
    Upstream(String),
}

pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[derive(Clone)]
pub struct SearchApiClient {
    client: Client,
    base_url: String,
    engine: String,
    api_key: String,
}

impl SearchApiClient {
    pub fn new(config: &SearchApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("Glimpse/1.0")
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build search API client: {e}"))?;

        Ok(Self::with_shared_client(client, config))
    }

    #[must_use]
    pub fn with_shared_client(client: Client, config: &SearchApiConfig) -> Self {
        if config.api_key.is_empty() {
            warn!("Search API key is not configured; profile lookups will be rejected upstream");
        }

        Self {
            client,
            base_url: config.base_url.clone(),
            engine: config.engine.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn request_url(&self, username: &Username) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::Transport(format!("invalid base URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("engine", &self.engine)
            .append_pair("username", username.as_str())
            .append_pair("api_key", &self.api_key);

        Ok(url)
    }

    async fn fetch_body(&self, username: &Username) -> Result<Value, FetchError> {
        let url = self.request_url(username)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            // The URL carries the API key.
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&text),
            });
        }

        let body: Value =
            serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))?;

        if let Some(message) = upstream_error(&body) {
            return Err(FetchError::Upstream(message));
        }

        Ok(body)
    }
}

/// Some providers answer 200 with `{"error": "..."}` and no profile.
fn upstream_error(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    if obj.contains_key("profile") {
        return None;
    }
    obj.get("error").and_then(|e| match e {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        _ => None,
    })
}

#[async_trait]
impl ProfileFetcher for SearchApiClient {
    async fn fetch(&self, username: &Username) -> Result<ProfileSnapshot, FetchError> {
        let start = Instant::now();
        debug!(username = %username, "Fetching profile from search API");

        let result = self.fetch_body(username).await.and_then(|body| {
            normalize_payload(&body)
                .ok_or_else(|| FetchError::Malformed("expected a JSON object".to_string()))
        });

        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(
            "upstream_requests_total",
            "service" => "search_api",
            "outcome" => outcome
        )
        .increment(1);
        metrics::histogram!("upstream_request_duration_seconds", "service" => "search_api")
            .record(start.elapsed().as_secs_f64());

        result
    }
}
