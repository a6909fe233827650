use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{InsightKind, Username};
use crate::models::{ProfileRecord, ProfileSnapshot, SearchHistoryEntry};

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to `:memory:` would be its own database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn history_repo(&self) -> repositories::history::HistoryRepository {
        repositories::history::HistoryRepository::new(self.conn.clone())
    }

    pub async fn get_profile(&self, username: &Username) -> Result<Option<ProfileRecord>> {
        self.profile_repo().get_by_username(username).await
    }

    pub async fn upsert_profile_snapshot(
        &self,
        username: &Username,
        snapshot: &ProfileSnapshot,
        fetched_at: DateTime<Utc>,
    ) -> Result<ProfileRecord> {
        self.profile_repo()
            .upsert_snapshot(username, snapshot, fetched_at)
            .await
    }

    pub async fn save_insight(
        &self,
        profile_id: i32,
        kind: InsightKind,
        document: &Value,
        generated_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.profile_repo()
            .save_insight(profile_id, kind, document, generated_at)
            .await
    }

    pub async fn clear_insight(&self, profile_id: i32, kind: InsightKind) -> Result<()> {
        self.profile_repo().clear_insight(profile_id, kind).await
    }

    pub async fn record_search(
        &self,
        caller_id: &str,
        profile_id: i32,
        searched_at: DateTime<Utc>,
    ) -> Result<()> {
        self.history_repo()
            .record(caller_id, profile_id, searched_at)
            .await
    }

    pub async fn list_search_history(
        &self,
        caller_id: &str,
        limit: u64,
    ) -> Result<Vec<SearchHistoryEntry>> {
        self.history_repo().list_for_caller(caller_id, limit).await
    }
}
