use serde_json::Value;
use std::collections::HashSet;

use super::{InsightPrompt, array_field, insights_digest, object, profile_summary, schema_error, string_field};
use crate::clients::LlmError;
use crate::domain::InsightKind;
use crate::models::ProfileRecord;

/// Persona ids and the badge color each must carry.
pub const PERSONAS: [(&str, &str); 3] = [
    ("friendly", "success"),
    ("tough", "warning"),
    ("irrational", "destructive"),
];

const SYSTEM_PROMPT: &str = r#"You create role-play personas so someone can practice talking to a person they found on Instagram.

Respond with a single JSON object:
{
  "personas": [
    {"id": string, "name": string, "description": string, "color": string, "systemPrompt": string}
  ]
}

Return exactly three personas:
- id "friendly", color "success": the person in a receptive, warm mood
- id "tough", color "warning": the person busy, skeptical and hard to impress
- id "irrational", color "destructive": the person moody and unpredictable

"description" is one sentence. "systemPrompt" is a 3 to 5 sentence instruction, written in the second person, that tells a chat model to role-play this person in that mood, matching the tone, interests and vocabulary visible in the profile. The persona never reveals it is an AI."#;

pub struct PersonasPrompt;

impl InsightPrompt for PersonasPrompt {
    fn kind(&self) -> InsightKind {
        InsightKind::Personas
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn user_prompt(&self, record: &ProfileRecord, max_posts: usize) -> String {
        format!(
            "Create practice personas for this person.\n\n{}\nProfile insights:\n{}",
            profile_summary(record, max_posts),
            insights_digest(record)
        )
    }

    fn validate(&self, document: &Value) -> Result<(), LlmError> {
        let root = object(document, "personas")?;
        let personas = array_field(root, "personas", "personas")?;

        let mut seen = HashSet::new();
        for persona in personas {
            let persona = object(persona, "personas[]")?;
            let id = string_field(persona, "id", "personas[]")?;
            let Some((_, color)) = PERSONAS.iter().find(|(known, _)| *known == id) else {
                return Err(schema_error(format!("unknown persona id '{id}'")));
            };
            if !seen.insert(id) {
                return Err(schema_error(format!("duplicate persona id '{id}'")));
            }
            if string_field(persona, "color", id)? != *color {
                return Err(schema_error(format!("persona '{id}' must use color '{color}'")));
            }
            string_field(persona, "name", id)?;
            string_field(persona, "description", id)?;
            string_field(persona, "systemPrompt", id)?;
        }

        if seen.len() != PERSONAS.len() {
            return Err(schema_error(format!(
                "expected {} personas, got {}",
                PERSONAS.len(),
                seen.len()
            )));
        }

        Ok(())
    }
}
