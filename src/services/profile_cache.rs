use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::freshness::FreshnessPolicy;
use crate::clients::{FetchError, ProfileFetcher};
use crate::db::Store;
use crate::domain::Username;
use crate::models::ProfileRecord;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for CacheError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// Read-through cache of raw profile snapshots.
#[derive(Clone)]
pub struct ProfileCache {
    store: Store,
    fetcher: Arc<dyn ProfileFetcher>,
    policy: FreshnessPolicy,
}

impl ProfileCache {
    #[must_use]
    pub fn new(store: Store, fetcher: Arc<dyn ProfileFetcher>, policy: FreshnessPolicy) -> Self {
        Self {
            store,
            fetcher,
            policy,
        }
    }

    /// Returns the stored record when its snapshot is within the profile
    /// window; otherwise fetches once and overwrites every snapshot field.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Fetch`] when the upstream call fails. The stored
    /// record, if any, is left untouched in that case.
    pub async fn get_or_fetch(&self, username: &Username) -> Result<ProfileRecord, CacheError> {
        let existing = self.store.get_profile(username).await?;

        let result = match &existing {
            None => "miss",
            Some(record) if self.policy.is_profile_stale(record, Utc::now()) => "stale",
            Some(_) => "hit",
        };
        metrics::counter!("profile_cache_lookups_total", "result" => result).increment(1);

        if let Some(record) = existing
            && result == "hit"
        {
            debug!(username = %username, "Profile cache hit");
            return Ok(record);
        }

        let snapshot = self.fetcher.fetch(username).await?;
        let record = self
            .store
            .upsert_profile_snapshot(username, &snapshot, Utc::now())
            .await?;

        info!(
            username = %username,
            followers = record.followers_count,
            posts = record.posts_data.len(),
            reason = result,
            "Profile snapshot refreshed"
        );

        Ok(record)
    }
}
