use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::domain::{InsightKind, Username};
use crate::entities::{prelude::*, profiles};
use crate::models::{ProfileRecord, ProfileSnapshot};

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Decodes a JSON text column, logging rows that no longer parse.
fn decode_column<T: DeserializeOwned>(profile_id: i32, column: &str, text: &str) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(profile_id, column, error = %e, "Stored profile column is not valid JSON");
            None
        }
    }
}

fn decode_timestamp(profile_id: i32, column: &str, text: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_timestamp(text);
    if parsed.is_none() {
        warn!(profile_id, column, value = %text, "Stored profile timestamp is not RFC 3339");
    }
    parsed
}

impl From<profiles::Model> for ProfileRecord {
    fn from(m: profiles::Model) -> Self {
        let id = m.id;
        let document = |column: &str, text: Option<&str>| {
            text.and_then(|json| decode_column::<Value>(id, column, json))
        };
        let optional_stamp =
            |column: &str, text: Option<&str>| text.and_then(|t| decode_timestamp(id, column, t));

        Self {
            id,
            bio_links: decode_column(id, "bio_links", &m.bio_links).unwrap_or_default(),
            posts_data: decode_column(id, "posts_data", &m.posts_data).unwrap_or_default(),
            raw_data: decode_column(id, "raw_data", &m.raw_data).unwrap_or(Value::Null),
            last_fetched_at: optional_stamp("last_fetched_at", m.last_fetched_at.as_deref()),
            insights_data: document("insights_data", m.insights_data.as_deref()),
            strategy_data: document("strategy_data", m.strategy_data.as_deref()),
            personas_data: document("personas_data", m.personas_data.as_deref()),
            insights_generated_at: optional_stamp(
                "insights_generated_at",
                m.insights_generated_at.as_deref(),
            ),
            created_at: decode_timestamp(id, "created_at", &m.created_at).unwrap_or_default(),
            updated_at: decode_timestamp(id, "updated_at", &m.updated_at).unwrap_or_default(),
            username: m.username,
            name: m.name,
            bio: m.bio,
            avatar: m.avatar,
            avatar_hd: m.avatar_hd,
            is_verified: m.is_verified,
            is_business: m.is_business,
            posts_count: m.posts_count,
            followers_count: m.followers_count,
            following_count: m.following_count,
            external_link: m.external_link,
        }
    }
}

const fn insight_column(kind: InsightKind) -> profiles::Column {
    match kind {
        InsightKind::Insights => profiles::Column::InsightsData,
        InsightKind::Strategy => profiles::Column::StrategyData,
        InsightKind::Personas => profiles::Column::PersonasData,
    }
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &Username) -> Result<Option<ProfileRecord>> {
        let model = Profiles::find()
            .filter(profiles::Column::Username.eq(username.as_str()))
            .one(&self.conn)
            .await
            .context("Failed to query profile by username")?;

        Ok(model.map(ProfileRecord::from))
    }

    /// Writes every snapshot field and `last_fetched_at`, creating the row if
    /// needed. AI-derived columns are left untouched.
    pub async fn upsert_snapshot(
        &self,
        username: &Username,
        snapshot: &ProfileSnapshot,
        fetched_at: DateTime<Utc>,
    ) -> Result<ProfileRecord> {
        let fetched = fetched_at.to_rfc3339();

        let active_model = profiles::ActiveModel {
            username: Set(username.as_str().to_string()),
            name: Set(snapshot.name.clone()),
            bio: Set(snapshot.bio.clone()),
            avatar: Set(snapshot.avatar.clone()),
            avatar_hd: Set(snapshot.avatar_hd.clone()),
            is_verified: Set(snapshot.is_verified),
            is_business: Set(snapshot.is_business),
            posts_count: Set(snapshot.posts_count),
            followers_count: Set(snapshot.followers_count),
            following_count: Set(snapshot.following_count),
            external_link: Set(snapshot.external_link.clone()),
            bio_links: Set(serde_json::to_string(&snapshot.bio_links)?),
            posts_data: Set(serde_json::to_string(&snapshot.posts)?),
            raw_data: Set(serde_json::to_string(&snapshot.raw)?),
            last_fetched_at: Set(Some(fetched.clone())),
            created_at: Set(fetched.clone()),
            updated_at: Set(fetched),
            ..Default::default()
        };

        Profiles::insert(active_model)
            .on_conflict(
                OnConflict::column(profiles::Column::Username)
                    .update_columns([
                        profiles::Column::Name,
                        profiles::Column::Bio,
                        profiles::Column::Avatar,
                        profiles::Column::AvatarHd,
                        profiles::Column::IsVerified,
                        profiles::Column::IsBusiness,
                        profiles::Column::PostsCount,
                        profiles::Column::FollowersCount,
                        profiles::Column::FollowingCount,
                        profiles::Column::ExternalLink,
                        profiles::Column::BioLinks,
                        profiles::Column::PostsData,
                        profiles::Column::RawData,
                        profiles::Column::LastFetchedAt,
                        profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert profile snapshot")?;

        self.get_by_username(username)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Profile '{username}' missing after upsert"))
    }

    /// Stores one AI-derived document. `generated_at` refreshes the shared
    /// insights clock when given; otherwise the clock is left as is.
    pub async fn save_insight(
        &self,
        profile_id: i32,
        kind: InsightKind,
        document: &Value,
        generated_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let json = serde_json::to_string(document)?;

        let mut update = Profiles::update_many()
            .col_expr(insight_column(kind), Expr::value(Some(json)))
            .col_expr(
                profiles::Column::UpdatedAt,
                Expr::value(Utc::now().to_rfc3339()),
            );

        if let Some(at) = generated_at {
            update = update.col_expr(
                profiles::Column::InsightsGeneratedAt,
                Expr::value(Some(at.to_rfc3339())),
            );
        }

        let result = update
            .filter(profiles::Column::Id.eq(profile_id))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to store {kind} for profile {profile_id}"))?;

        if result.rows_affected == 0 {
            anyhow::bail!("Profile {profile_id} not found while storing {kind}");
        }

        Ok(())
    }

    /// Sets one AI document back to NULL. The insights clock is left alone.
    pub async fn clear_insight(&self, profile_id: i32, kind: InsightKind) -> Result<()> {
        Profiles::update_many()
            .col_expr(insight_column(kind), Expr::value(Option::<String>::None))
            .col_expr(
                profiles::Column::UpdatedAt,
                Expr::value(Utc::now().to_rfc3339()),
            )
            .filter(profiles::Column::Id.eq(profile_id))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to clear {kind} for profile {profile_id}"))?;

        Ok(())
    }
}
