//! LLM-backed generators for the three AI-derived profile documents.
//!
//! Every generator shares the same loop: build a fixed system prompt and a
//! profile-derived user prompt, ask for a JSON object, check it against the
//! document's structure, then persist it onto the profile row. LLM failures
//! stop at this boundary; only storage failures propagate.

pub mod insights;
pub mod personas;
pub mod strategy;

use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt::Write as _;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::freshness::FreshnessPolicy;
use crate::clients::{LlmClient, LlmError};
use crate::config::Config;
use crate::db::Store;
use crate::domain::InsightKind;
use crate::models::ProfileRecord;
use crate::models::profile::is_present;

pub use insights::InsightsPrompt;
pub use personas::PersonasPrompt;
pub use strategy::StrategyPrompt;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for GenerationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Prompt and schema of one AI-derived document.
pub trait InsightPrompt: Send + Sync {
    fn kind(&self) -> InsightKind;

    fn system_prompt(&self) -> &'static str;

    fn user_prompt(&self, record: &ProfileRecord, max_posts: usize) -> String;

    /// Structural check of a parsed completion.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Schema`] describing the first violation.
    fn validate(&self, document: &Value) -> Result<(), LlmError>;
}

pub struct InsightGenerator {
    prompt: Box<dyn InsightPrompt>,
    llm: Arc<dyn LlmClient>,
    store: Store,
    policy: FreshnessPolicy,
    temperature: f32,
    max_posts: usize,
}

impl InsightGenerator {
    #[must_use]
    pub fn new(
        prompt: Box<dyn InsightPrompt>,
        llm: Arc<dyn LlmClient>,
        store: Store,
        policy: FreshnessPolicy,
        temperature: f32,
        max_posts: usize,
    ) -> Self {
        Self {
            prompt,
            llm,
            store,
            policy,
            temperature,
            max_posts,
        }
    }

    /// The three generators in pipeline order.
    #[must_use]
    pub fn pipeline(store: &Store, llm: &Arc<dyn LlmClient>, config: &Config) -> Vec<Self> {
        let policy = FreshnessPolicy::from(&config.cache);
        let max_posts = config.cache.max_posts_in_prompt;
        let build = |prompt: Box<dyn InsightPrompt>, temperature: f32| {
            Self::new(prompt, llm.clone(), store.clone(), policy, temperature, max_posts)
        };

        vec![
            build(Box::new(InsightsPrompt), config.llm.insights_temperature),
            build(Box::new(StrategyPrompt), config.llm.strategy_temperature),
            build(Box::new(PersonasPrompt), config.llm.personas_temperature),
        ]
    }

    #[must_use]
    pub fn kind(&self) -> InsightKind {
        self.prompt.kind()
    }

    /// Returns the stored document when it is present and the insights clock
    /// is within its window; generates otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] only when persisting the document fails.
    pub async fn ensure_fresh(
        &self,
        record: &mut ProfileRecord,
    ) -> Result<Option<Value>, GenerationError> {
        let kind = self.kind();
        if !self.policy.needs_generation(record, kind, Utc::now()) {
            return Ok(record.insight(kind).cloned());
        }
        self.force_regenerate(record).await
    }

    /// Generates and stores the document unconditionally. On success the
    /// record is updated in place.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] only when persisting the document fails.
    pub async fn force_regenerate(
        &self,
        record: &mut ProfileRecord,
    ) -> Result<Option<Value>, GenerationError> {
        let kind = self.kind();
        let user_prompt = self.prompt.user_prompt(record, self.max_posts);

        let document = match self
            .llm
            .complete_json(self.prompt.system_prompt(), &user_prompt, self.temperature)
            .await
            .and_then(|doc| self.prompt.validate(&doc).map(|()| doc))
        {
            Ok(doc) => doc,
            Err(e) => {
                let outcome = if matches!(e, LlmError::Schema(_)) {
                    "invalid"
                } else {
                    "error"
                };
                metrics::counter!(
                    "insight_generations_total",
                    "kind" => kind.as_str(),
                    "outcome" => outcome
                )
                .increment(1);
                warn!(username = %record.username, kind = %kind, error = %e, "Insight generation failed");
                return Ok(None);
            }
        };

        let generated_at = (kind == InsightKind::Insights).then(Utc::now);
        self.store
            .save_insight(record.id, kind, &document, generated_at)
            .await?;

        record.set_insight(kind, document.clone());
        if let Some(at) = generated_at {
            record.insights_generated_at = Some(at);
        }

        metrics::counter!(
            "insight_generations_total",
            "kind" => kind.as_str(),
            "outcome" => "success"
        )
        .increment(1);
        info!(username = %record.username, kind = %kind, "Insight document generated");

        Ok(Some(document))
    }

    /// Drops this generator's stored document so the next lookup generates it
    /// again, whatever the insights clock says.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] when the update fails.
    pub async fn discard(&self, record: &mut ProfileRecord) -> Result<(), GenerationError> {
        let kind = self.kind();
        if record.insight(kind).is_none() {
            return Ok(());
        }
        self.store.clear_insight(record.id, kind).await?;
        record.clear_insight(kind);
        warn!(username = %record.username, kind = %kind, "Dropped expired document");
        Ok(())
    }
}

/// Profile facts and the most recent posts, shared by every user prompt.
pub(crate) fn profile_summary(record: &ProfileRecord, max_posts: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Username: @{}", record.username);
    if let Some(name) = &record.name {
        let _ = writeln!(out, "Name: {name}");
    }
    let _ = writeln!(out, "Bio: {}", record.bio.as_deref().unwrap_or("(empty)"));
    let _ = writeln!(
        out,
        "Followers: {} | Following: {} | Posts: {}",
        record.followers_count, record.following_count, record.posts_count
    );
    if record.is_verified {
        out.push_str("Verified account\n");
    }
    if record.is_business {
        out.push_str("Business account\n");
    }
    if let Some(link) = &record.external_link {
        let _ = writeln!(out, "External link: {link}");
    }
    for link in &record.bio_links {
        let _ = writeln!(out, "Bio link: {} ({})", link.title, link.url);
    }

    if record.posts_data.is_empty() {
        out.push_str("\nRecent posts: none available\n");
        return out;
    }

    out.push_str("\nRecent posts:\n");
    for (i, post) in record.posts_data.iter().take(max_posts).enumerate() {
        let caption = post.caption.trim();
        let caption = if caption.is_empty() { "(no caption)" } else { caption };
        let _ = write!(
            out,
            "{}. \"{}\" ({} likes, {} comments)",
            i + 1,
            caption.replace('\n', " "),
            post.likes,
            post.comments
        );
        if !post.tagged_users.is_empty() {
            let _ = write!(out, " tagged: {}", post.tagged_users.join(", "));
        }
        out.push('\n');
    }

    out
}

fn label_value(section: &Value) -> Option<String> {
    section
        .get("value")
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn string_items(section: &Value) -> Vec<&str> {
    section
        .get("items")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Compact digest of the stored insights document for the follow-up prompts.
pub(crate) fn insights_digest(record: &ProfileRecord) -> String {
    let Some(doc) = record.insights_data.as_ref().filter(|d| is_present(Some(*d))) else {
        return "No insights available".to_string();
    };

    let mut lines = Vec::new();
    if let Some(tone) = doc.get("tone").and_then(label_value) {
        lines.push(format!("Tone: {tone}"));
    }
    if let Some(posture) = doc.get("posture").and_then(label_value) {
        lines.push(format!("Posture: {posture}"));
    }
    for (key, title) in [("topics", "Topics"), ("interests", "Interests")] {
        let items = doc.get(key).map(string_items).unwrap_or_default();
        if !items.is_empty() {
            lines.push(format!("{title}: {}", items.join(", ")));
        }
    }
    let traits: Vec<String> = doc
        .pointer("/personality/traits")
        .and_then(Value::as_array)
        .map(|traits| {
            traits
                .iter()
                .filter_map(|t| {
                    let name = t.get("trait")?.as_str()?;
                    let score = t.get("score")?.as_f64()?;
                    Some(format!("{name} {score:.0}"))
                })
                .collect()
        })
        .unwrap_or_default();
    if !traits.is_empty() {
        lines.push(format!("Personality: {}", traits.join(", ")));
    }
    let flags: Vec<&str> = doc
        .pointer("/flags/items")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|f| f.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if !flags.is_empty() {
        lines.push(format!("Flags: {}", flags.join("; ")));
    }

    if lines.is_empty() {
        return "No insights available".to_string();
    }
    lines.join("\n")
}

pub(crate) fn schema_error(message: impl Into<String>) -> LlmError {
    LlmError::Schema(message.into())
}

pub(crate) fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, LlmError> {
    value
        .as_object()
        .ok_or_else(|| schema_error(format!("{path} must be an object")))
}

pub(crate) fn field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Value, LlmError> {
    map.get(key)
        .ok_or_else(|| schema_error(format!("{path}.{key} is missing")))
}

pub(crate) fn string_field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, LlmError> {
    field(map, key, path)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| schema_error(format!("{path}.{key} must be a non-empty string")))
}

pub(crate) fn array_field<'a>(
    map: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Vec<Value>, LlmError> {
    field(map, key, path)?
        .as_array()
        .ok_or_else(|| schema_error(format!("{path}.{key} must be an array")))
}

pub(crate) fn score_field(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<f64, LlmError> {
    field(map, key, path)?
        .as_f64()
        .filter(|score| (0.0..=100.0).contains(score))
        .ok_or_else(|| schema_error(format!("{path}.{key} must be a number between 0 and 100")))
}

/// Item counts outside the requested range are logged, not rejected.
pub(crate) fn check_count(kind: InsightKind, path: &str, len: usize, min: usize, max: usize) {
    if !(min..=max).contains(&len) {
        warn!(kind = %kind, path, len, min, max, "Generated list size outside requested range");
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub fn insights() -> Value {
        json!({
            "tone": {"label": "Tone", "value": "Warm and playful", "score": 78},
            "topics": {"label": "Topics", "items": ["coffee", "travel", "design", "code", "music"]},
            "words": {"label": "Words", "items": [
                {"word": "coffee", "count": 9}, {"word": "morning", "count": 6},
                {"word": "build", "count": 5}, {"word": "ship", "count": 4},
                {"word": "trip", "count": 3}, {"word": "friends", "count": 3}
            ]},
            "personality": {"label": "Personality", "traits": [
                {"trait": "Openness", "score": 82},
                {"trait": "Conscientiousness", "score": 64},
                {"trait": "Extraversion", "score": 71},
                {"trait": "Agreeableness", "score": 77},
                {"trait": "Neuroticism", "score": 28}
            ]},
            "posture": {"label": "Posture", "value": "Approachable creator"},
            "interests": {"label": "Interests", "items": ["espresso", "hiking", "typography", "rust", "vinyl"]},
            "flags": {"label": "Flags", "items": [
                {"text": "Replies to comments", "type": "success"},
                {"text": "Rarely posts on weekends", "type": "warning"},
                {"text": "Consistent branding", "type": "success"}
            ]}
        })
    }

    pub fn strategy() -> Value {
        let ids = [
            ("icebreakers", "message-circle"),
            ("avoid", "alert-triangle"),
            ("topics", "list"),
            ("common", "users"),
            ("contact", "phone"),
            ("impression", "star"),
            ("followup", "calendar"),
        ];
        json!({
            "sections": ids.iter().map(|(id, icon)| json!({
                "id": id,
                "question": format!("What about {id}?"),
                "answer": "Start with their latest trip. Keep it light and specific.",
                "icon": icon,
            })).collect::<Vec<_>>()
        })
    }

    pub fn personas() -> Value {
        json!({
            "personas": [
                {"id": "friendly", "name": "Friendly Alex", "description": "Open and curious",
                 "color": "success", "systemPrompt": "You are Alex in a good mood. Be warm. Ask questions."},
                {"id": "tough", "name": "Tough Alex", "description": "Skeptical and busy",
                 "color": "warning", "systemPrompt": "You are Alex with little time. Push back. Demand specifics."},
                {"id": "irrational", "name": "Irrational Alex", "description": "Unpredictable",
                 "color": "destructive", "systemPrompt": "You are Alex on a bad day. Change topics. Be contrary."}
            ]
        })
    }
}
