#![allow(dead_code)]

use async_trait::async_trait;
use glimpse::clients::{ChatMessage, FetchError, LlmClient, LlmError, ProfileFetcher};
use glimpse::config::Config;
use glimpse::db::Store;
use glimpse::domain::{InsightKind, Username};
use glimpse::models::ProfileSnapshot;
use glimpse::parser::normalize_payload;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub fn temp_db_url() -> String {
    let path = std::env::temp_dir().join(format!("glimpse-test-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite:{}", path.display())
}

pub async fn temp_store() -> Store {
    Store::new(&temp_db_url()).await.expect("Failed to open store")
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = temp_db_url();
    config.observability.metrics_enabled = false;
    config
}

pub fn username(raw: &str) -> Username {
    Username::parse(raw).expect("valid username")
}

/// Counting stand-in for the search API.
pub struct FakeFetcher {
    calls: AtomicUsize,
    payload: Mutex<Value>,
    fail: AtomicBool,
    delay: Duration,
}

impl FakeFetcher {
    pub fn new(payload: Value) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            payload: Mutex::new(payload),
            fail: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(payload: Value, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::new(payload)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_payload(&self, payload: Value) {
        *self.payload.lock().unwrap() = payload;
    }
}

#[async_trait]
impl ProfileFetcher for FakeFetcher {
    async fn fetch(&self, _username: &Username) -> Result<ProfileSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let payload = self.payload.lock().unwrap().clone();
        normalize_payload(&payload)
            .ok_or_else(|| FetchError::Malformed("expected a JSON object".to_string()))
    }
}

/// Counting stand-in for the chat completion API. Each generator is told
/// apart by the first line of its user prompt.
pub struct FakeLlm {
    json_calls: Mutex<HashMap<InsightKind, usize>>,
    responses: Mutex<HashMap<InsightKind, Result<Value, String>>>,
    chat_calls: AtomicUsize,
    chat_failing: AtomicBool,
    last_conversation: Mutex<Vec<ChatMessage>>,
}

impl Default for FakeLlm {
    fn default() -> Self {
        let responses = HashMap::from([
            (InsightKind::Insights, Ok(insights_doc())),
            (InsightKind::Strategy, Ok(strategy_doc())),
            (InsightKind::Personas, Ok(personas_doc())),
        ]);
        Self {
            json_calls: Mutex::new(HashMap::new()),
            responses: Mutex::new(responses),
            chat_calls: AtomicUsize::new(0),
            chat_failing: AtomicBool::new(false),
            last_conversation: Mutex::new(Vec::new()),
        }
    }
}

fn kind_of(user_prompt: &str) -> InsightKind {
    if user_prompt.starts_with("Analyze") {
        InsightKind::Insights
    } else if user_prompt.starts_with("Write a conversation prep guide") {
        InsightKind::Strategy
    } else {
        InsightKind::Personas
    }
}

impl FakeLlm {
    pub fn calls(&self, kind: InsightKind) -> usize {
        self.json_calls
            .lock()
            .unwrap()
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.json_calls.lock().unwrap().values().sum()
    }

    pub fn respond(&self, kind: InsightKind, response: Result<Value, &str>) {
        self.responses
            .lock()
            .unwrap()
            .insert(kind, response.map_err(ToString::to_string));
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }

    pub fn set_chat_failing(&self, fail: bool) {
        self.chat_failing.store(fail, Ordering::SeqCst);
    }

    pub fn last_conversation(&self) -> Vec<ChatMessage> {
        self.last_conversation.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    async fn complete_json(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _temperature: f32,
    ) -> Result<Value, LlmError> {
        let kind = kind_of(user_prompt);
        *self.json_calls.lock().unwrap().entry(kind).or_default() += 1;

        match self.responses.lock().unwrap().get(&kind) {
            Some(Ok(doc)) => Ok(doc.clone()),
            Some(Err(msg)) => Err(LlmError::Transport(msg.clone())),
            None => Err(LlmError::EmptyContent),
        }
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
    ) -> Result<String, LlmError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_conversation.lock().unwrap() = messages.to_vec();

        if self.chat_failing.load(Ordering::SeqCst) {
            return Err(LlmError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }

        let last = messages.last().map_or("", |m| m.content.as_str());
        Ok(format!("  You said: {last}  "))
    }
}

pub fn alex_payload() -> Value {
    json!({"name": "Alex", "bio": "hi", "followers": 100})
}

pub fn nested_payload() -> Value {
    json!({
        "profile": {
            "username": "sam",
            "full_name": "Sam Rivera",
            "biography": "Coffee, code and trail runs",
            "profile_pic_url": "https://cdn.example.com/sam.jpg",
            "is_verified": true,
            "follower_count": "12,345",
            "following_count": 321,
            "media_count": 2
        },
        "posts": [
            {"caption": "Sunday long run", "like_count": 120, "comment_count": 8, "usertags": ["jo"]},
            {"caption": "New espresso setup", "likes": 95, "comments": 4}
        ]
    })
}

pub fn insights_doc() -> Value {
    json!({
        "tone": {"label": "Tone", "value": "Warm", "score": 80},
        "topics": {"label": "Topics", "items": ["coffee", "running", "code", "travel", "design"]},
        "words": {"label": "Words", "items": [
            {"word": "coffee", "count": 5}, {"word": "run", "count": 4}, {"word": "ship", "count": 3},
            {"word": "build", "count": 3}, {"word": "trail", "count": 2}, {"word": "team", "count": 2}
        ]},
        "personality": {"label": "Personality", "traits": [
            {"trait": "Openness", "score": 80},
            {"trait": "Conscientiousness", "score": 70},
            {"trait": "Extraversion", "score": 60},
            {"trait": "Agreeableness", "score": 75},
            {"trait": "Neuroticism", "score": 30}
        ]},
        "posture": {"label": "Posture", "value": "Friendly builder"},
        "interests": {"label": "Interests", "items": ["espresso", "trails", "rust", "books", "music"]},
        "flags": {"label": "Flags", "items": [
            {"text": "Responds to comments", "type": "success"},
            {"text": "Posts irregularly", "type": "warning"},
            {"text": "Clear personal brand", "type": "success"}
        ]}
    })
}

pub fn strategy_doc() -> Value {
    let sections: Vec<Value> = [
        "icebreakers",
        "avoid",
        "topics",
        "common",
        "contact",
        "impression",
        "followup",
    ]
    .iter()
    .map(|id| {
        json!({
            "id": id,
            "question": format!("How to handle {id}?"),
            "answer": "Mention their latest run. Keep it short.",
            "icon": "sparkles"
        })
    })
    .collect();
    json!({ "sections": sections })
}

pub fn personas_doc() -> Value {
    json!({
        "personas": [
            {"id": "friendly", "name": "Friendly", "description": "Open",
             "color": "success", "systemPrompt": "You are friendly Alex. Be warm."},
            {"id": "tough", "name": "Tough", "description": "Busy",
             "color": "warning", "systemPrompt": "You are busy Alex. Be curt."},
            {"id": "irrational", "name": "Irrational", "description": "Moody",
             "color": "destructive", "systemPrompt": "You are moody Alex. Be contrary."}
        ]
    })
}
