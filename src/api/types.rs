use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::domain::InsightKind;
use crate::models::profile::is_present;
use crate::models::{BioLink, Post, ProfileRecord, SearchHistoryEntry};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// AI sections that are still missing and will be generated on a later
/// lookup.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PendingDto {
    pub insights: bool,
    pub strategy: bool,
    pub personas: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileDto {
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
    pub posts: Vec<Post>,
    pub last_fetched_at: Option<String>,
    pub insights: Option<Value>,
    pub strategy: Option<Value>,
    pub personas: Option<Value>,
    pub insights_generated_at: Option<String>,
    pub pending: PendingDto,
}

impl From<&ProfileRecord> for ProfileDto {
    fn from(record: &ProfileRecord) -> Self {
        let section = |kind| {
            record
                .insight(kind)
                .filter(|v| is_present(Some(*v)))
                .cloned()
        };
        let insights = section(InsightKind::Insights);
        let strategy = section(InsightKind::Strategy);
        let personas = section(InsightKind::Personas);

        Self {
            id: record.id,
            username: record.username.clone(),
            name: record.name.clone(),
            bio: record.bio.clone(),
            avatar: record.avatar.clone(),
            avatar_hd: record.avatar_hd.clone(),
            is_verified: record.is_verified,
            is_business: record.is_business,
            posts_count: record.posts_count,
            followers_count: record.followers_count,
            following_count: record.following_count,
            external_link: record.external_link.clone(),
            bio_links: record.bio_links.clone(),
            posts: record.posts_data.clone(),
            last_fetched_at: record.last_fetched_at.map(timestamp),
            pending: PendingDto {
                insights: insights.is_none(),
                strategy: strategy.is_none(),
                personas: personas.is_none(),
            },
            insights,
            strategy,
            personas,
            insights_generated_at: record.insights_generated_at.map(timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryEntryDto {
    pub profile_id: i32,
    pub username: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub searched_at: String,
}

impl From<SearchHistoryEntry> for HistoryEntryDto {
    fn from(entry: SearchHistoryEntry) -> Self {
        Self {
            profile_id: entry.profile_id,
            username: entry.username,
            name: entry.name,
            avatar: entry.avatar,
            searched_at: timestamp(entry.searched_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatReplyDto {
    pub reply: String,
}
