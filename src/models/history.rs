use chrono::{DateTime, Utc};
use serde::Serialize;

/// A caller's lookup of a cached profile, joined with the profile summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHistoryEntry {
    pub id: i32,
    pub caller_id: String,
    pub profile_id: i32,
    pub username: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub searched_at: DateTime<Utc>,
}
