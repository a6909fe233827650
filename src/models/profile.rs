use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::InsightKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub tagged_users: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
}

/// Canonical snapshot produced by normalizing one search API response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub avatar_hd: Option<String>,
    pub is_verified: bool,
    pub is_business: bool,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub external_link: Option<String>,
    pub bio_links: Vec<BioLink>,
    pub posts: Vec<Post>,
    /// The unparsed upstream body.
    pub raw: Value,
}

/// One cached profile: the latest snapshot plus the AI-derived documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileRecord {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub avatar_hd: Option<String>,
    pub is_verified: bool,
    pub is_business: bool,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub external_link: Option<String>,
    pub bio_links: Vec<BioLink>,
    pub posts_data: Vec<Post>,
    pub raw_data: Value,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub insights_data: Option<Value>,
    pub strategy_data: Option<Value>,
    pub personas_data: Option<Value>,
    pub insights_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    #[must_use]
    pub const fn insight(&self, kind: InsightKind) -> Option<&Value> {
        match kind {
            InsightKind::Insights => self.insights_data.as_ref(),
            InsightKind::Strategy => self.strategy_data.as_ref(),
            InsightKind::Personas => self.personas_data.as_ref(),
        }
    }

    pub fn set_insight(&mut self, kind: InsightKind, value: Value) {
        match kind {
            InsightKind::Insights => self.insights_data = Some(value),
            InsightKind::Strategy => self.strategy_data = Some(value),
            InsightKind::Personas => self.personas_data = Some(value),
        }
    }

    pub fn clear_insight(&mut self, kind: InsightKind) {
        match kind {
            InsightKind::Insights => self.insights_data = None,
            InsightKind::Strategy => self.strategy_data = None,
            InsightKind::Personas => self.personas_data = None,
        }
    }

    /// Looks up a generated persona's role-play instruction by id.
    #[must_use]
    pub fn persona_prompt(&self, persona_id: &str) -> Option<&str> {
        self.personas_data
            .as_ref()?
            .get("personas")?
            .as_array()?
            .iter()
            .find(|p| p.get("id").and_then(Value::as_str) == Some(persona_id))?
            .get("systemPrompt")
            .and_then(Value::as_str)
    }
}

/// Whether a stored AI document counts as content.
///
/// `null`, empty strings, arrays and objects are treated as absent.
#[must_use]
pub fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn presence_rules() {
        assert!(!is_present(None));
        assert!(!is_present(Some(&Value::Null)));
        assert!(!is_present(Some(&json!({}))));
        assert!(!is_present(Some(&json!([]))));
        assert!(!is_present(Some(&json!("  "))));
        assert!(is_present(Some(&json!({"tone": {}}))));
    }

    #[test]
    fn persona_prompt_lookup() {
        let now = Utc::now();
        let record = ProfileRecord {
            id: 1,
            username: "alex".to_string(),
            name: None,
            bio: None,
            avatar: None,
            avatar_hd: None,
            is_verified: false,
            is_business: false,
            posts_count: 0,
            followers_count: 0,
            following_count: 0,
            external_link: None,
            bio_links: vec![],
            posts_data: vec![],
            raw_data: Value::Null,
            last_fetched_at: None,
            insights_data: None,
            strategy_data: None,
            personas_data: Some(json!({
                "personas": [
                    {"id": "friendly", "systemPrompt": "Be warm."},
                    {"id": "tough", "systemPrompt": "Be blunt."}
                ]
            })),
            insights_generated_at: None,
            created_at: now,
            updated_at: now,
        };

        assert_eq!(record.persona_prompt("tough"), Some("Be blunt."));
        assert_eq!(record.persona_prompt("irrational"), None);
    }
}
