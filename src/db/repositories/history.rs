use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::profile::parse_timestamp;
use crate::entities::{prelude::*, search_history};
use crate::models::SearchHistoryEntry;

pub struct HistoryRepository {
    conn: DatabaseConnection,
}

impl HistoryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// One row per (caller, profile); repeat lookups bump `searched_at`.
    pub async fn record(
        &self,
        caller_id: &str,
        profile_id: i32,
        searched_at: DateTime<Utc>,
    ) -> Result<()> {
        let active_model = search_history::ActiveModel {
            caller_id: Set(caller_id.to_string()),
            profile_id: Set(profile_id),
            searched_at: Set(searched_at.to_rfc3339()),
            ..Default::default()
        };

        SearchHistory::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    search_history::Column::CallerId,
                    search_history::Column::ProfileId,
                ])
                .update_column(search_history::Column::SearchedAt)
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to record search history")?;

        Ok(())
    }

    pub async fn list_for_caller(
        &self,
        caller_id: &str,
        limit: u64,
    ) -> Result<Vec<SearchHistoryEntry>> {
        let rows = SearchHistory::find()
            .filter(search_history::Column::CallerId.eq(caller_id))
            .order_by_desc(search_history::Column::SearchedAt)
            .order_by_desc(search_history::Column::Id)
            .limit(limit)
            .find_also_related(Profiles)
            .all(&self.conn)
            .await
            .context("Failed to load search history")?;

        Ok(rows
            .into_iter()
            .filter_map(|(entry, profile)| {
                let profile = profile?;
                Some(SearchHistoryEntry {
                    id: entry.id,
                    caller_id: entry.caller_id,
                    profile_id: entry.profile_id,
                    username: profile.username,
                    name: profile.name,
                    avatar: profile.avatar,
                    searched_at: parse_timestamp(&entry.searched_at).unwrap_or_default(),
                })
            })
            .collect())
    }
}
