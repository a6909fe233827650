use serde_json::Value;

use super::{
    InsightPrompt, array_field, check_count, object, profile_summary, schema_error, score_field,
    string_field,
};
use crate::clients::LlmError;
use crate::domain::InsightKind;
use crate::models::ProfileRecord;

const SYSTEM_PROMPT: &str = r#"You are a social media analyst. You read an Instagram profile and its recent posts and describe the person behind it.

Respond with a single JSON object with exactly these keys:
{
  "tone": {"label": "Tone", "value": string, "score": integer 0-100},
  "topics": {"label": "Topics", "items": [string, 5 to 8 items]},
  "words": {"label": "Frequent words", "items": [{"word": string, "count": integer}, 6 to 10 items]},
  "personality": {"label": "Personality", "traits": [{"trait": string, "score": integer 0-100}]},
  "posture": {"label": "Posture", "value": string},
  "interests": {"label": "Interests", "items": [string, 5 to 8 items]},
  "flags": {"label": "Flags", "items": [{"text": string, "type": "warning" or "success"}, 3 to 5 items]}
}

"personality.traits" must contain exactly the five Big Five traits in this order: Openness, Conscientiousness, Extraversion, Agreeableness, Neuroticism.
Base every statement on the profile data provided. When data is thin, say so in the values instead of inventing details."#;

const SECTIONS: [&str; 7] = [
    "tone",
    "topics",
    "words",
    "personality",
    "posture",
    "interests",
    "flags",
];

pub struct InsightsPrompt;

impl InsightPrompt for InsightsPrompt {
    fn kind(&self) -> InsightKind {
        InsightKind::Insights
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn user_prompt(&self, record: &ProfileRecord, max_posts: usize) -> String {
        format!(
            "Analyze this Instagram profile.\n\n{}",
            profile_summary(record, max_posts)
        )
    }

    fn validate(&self, document: &Value) -> Result<(), LlmError> {
        let kind = self.kind();
        let root = object(document, "insights")?;

        for key in SECTIONS {
            let section = object(
                root.get(key)
                    .ok_or_else(|| schema_error(format!("insights.{key} is missing")))?,
                key,
            )?;
            string_field(section, "label", key)?;
        }

        let tone = object(&root["tone"], "tone")?;
        string_field(tone, "value", "tone")?;
        score_field(tone, "score", "tone")?;

        let posture = object(&root["posture"], "posture")?;
        string_field(posture, "value", "posture")?;

        for key in ["topics", "interests"] {
            let items = array_field(object(&root[key], key)?, "items", key)?;
            if items.iter().any(|item| !item.is_string()) {
                return Err(schema_error(format!("{key}.items must be strings")));
            }
            check_count(kind, key, items.len(), 5, 8);
        }

        let words = array_field(object(&root["words"], "words")?, "items", "words")?;
        for item in words {
            let item = object(item, "words.items[]")?;
            string_field(item, "word", "words.items[]")?;
            if !item.get("count").is_some_and(Value::is_number) {
                return Err(schema_error("words.items[].count must be a number"));
            }
        }
        check_count(kind, "words", words.len(), 6, 10);

        let traits = array_field(
            object(&root["personality"], "personality")?,
            "traits",
            "personality",
        )?;
        if traits.len() != 5 {
            return Err(schema_error(format!(
                "personality.traits must have exactly 5 entries, got {}",
                traits.len()
            )));
        }
        for item in traits {
            let item = object(item, "personality.traits[]")?;
            string_field(item, "trait", "personality.traits[]")?;
            score_field(item, "score", "personality.traits[]")?;
        }

        let flags = array_field(object(&root["flags"], "flags")?, "items", "flags")?;
        for item in flags {
            let item = object(item, "flags.items[]")?;
            string_field(item, "text", "flags.items[]")?;
            match item.get("type").and_then(Value::as_str) {
                Some("warning" | "success") => {}
                other => {
                    return Err(schema_error(format!(
                        "flags.items[].type must be warning or success, got {other:?}"
                    )));
                }
            }
        }
        check_count(kind, "flags", flags.len(), 3, 5);

        Ok(())
    }
}
