use serde_json::Value;
use std::collections::HashSet;

use super::{InsightPrompt, array_field, insights_digest, object, profile_summary, schema_error, string_field};
use crate::clients::LlmError;
use crate::domain::InsightKind;
use crate::models::ProfileRecord;

pub const SECTION_IDS: [&str; 7] = [
    "icebreakers",
    "avoid",
    "topics",
    "common",
    "contact",
    "impression",
    "followup",
];

const SYSTEM_PROMPT: &str = r#"You help people prepare for a first conversation with someone they found on Instagram.

Respond with a single JSON object:
{
  "sections": [
    {"id": string, "question": string, "answer": string, "icon": string}
  ]
}

Return exactly seven sections, one for each id, in this order:
- "icebreakers": good ways to open the conversation
- "avoid": topics or behaviour to avoid
- "topics": subjects they are likely to enjoy discussing
- "common": how to find common ground
- "contact": the best channel and moment to reach out
- "impression": how to make a good first impression
- "followup": how to follow up afterwards

Each answer is 2 to 4 sentences, concrete and grounded in the profile. "icon" is a short lucide icon name."#;

pub struct StrategyPrompt;

impl InsightPrompt for StrategyPrompt {
    fn kind(&self) -> InsightKind {
        InsightKind::Strategy
    }

    fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    fn user_prompt(&self, record: &ProfileRecord, max_posts: usize) -> String {
        format!(
            "Write a conversation prep guide for this person.\n\n{}\nProfile insights:\n{}",
            profile_summary(record, max_posts),
            insights_digest(record)
        )
    }

    fn validate(&self, document: &Value) -> Result<(), LlmError> {
        let root = object(document, "strategy")?;
        let sections = array_field(root, "sections", "strategy")?;

        let mut seen = HashSet::new();
        for section in sections {
            let section = object(section, "sections[]")?;
            let id = string_field(section, "id", "sections[]")?;
            if !SECTION_IDS.contains(&id) {
                return Err(schema_error(format!("unknown section id '{id}'")));
            }
            if !seen.insert(id) {
                return Err(schema_error(format!("duplicate section id '{id}'")));
            }
            string_field(section, "question", id)?;
            string_field(section, "answer", id)?;
            string_field(section, "icon", id)?;
        }

        if seen.len() != SECTION_IDS.len() {
            let missing: Vec<&str> = SECTION_IDS
                .iter()
                .copied()
                .filter(|id| !seen.contains(id))
                .collect();
            return Err(schema_error(format!(
                "missing sections: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }
}
