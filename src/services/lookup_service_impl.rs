//! `SeaORM`-backed implementation of [`ProfileLookupService`].

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::freshness::FreshnessPolicy;
use super::generators::InsightGenerator;
use super::keyed_lock::KeyedLocks;
use super::lookup_service::{ChatError, LookupError, ProfileLookupService};
use super::profile_cache::ProfileCache;
use crate::clients::{ChatMessage, ChatRole, LlmClient, ProfileFetcher};
use crate::config::Config;
use crate::db::Store;
use crate::domain::{InsightKind, Username};
use crate::models::{ProfileRecord, SearchHistoryEntry};

pub struct SeaOrmLookupService {
    store: Store,
    cache: ProfileCache,
    generators: Vec<InsightGenerator>,
    llm: Arc<dyn LlmClient>,
    policy: FreshnessPolicy,
    locks: KeyedLocks,
    chat_temperature: f32,
}

impl SeaOrmLookupService {
    #[must_use]
    pub fn new(
        store: Store,
        fetcher: Arc<dyn ProfileFetcher>,
        llm: Arc<dyn LlmClient>,
        config: &Config,
    ) -> Self {
        let policy = FreshnessPolicy::from(&config.cache);

        Self {
            cache: ProfileCache::new(store.clone(), fetcher, policy),
            generators: InsightGenerator::pipeline(&store, &llm, config),
            store,
            llm,
            policy,
            locks: KeyedLocks::new(),
            chat_temperature: config.llm.chat_temperature,
        }
    }

    /// Runs the generators over `record`.
    ///
    /// The insights clock is read once before anything runs. When it has
    /// expired every document is regenerated, and a document whose
    /// regeneration fails is dropped: a refreshed clock must not vouch for
    /// it, and an absent field is retried on the next lookup.
    async fn refresh_insights(&self, record: &mut ProfileRecord) {
        let now = Utc::now();
        let due = self.policy.stale_kinds(record, now);
        if due.is_empty() {
            return;
        }

        let clock_expired = self.policy.is_insights_clock_stale(record, now);
        info!(
            username = %record.username,
            due = ?due,
            clock_expired,
            "Refreshing profile insights"
        );

        for generator in &self.generators {
            let result = if clock_expired {
                match generator.force_regenerate(record).await {
                    Ok(None) => generator.discard(record).await.map(|()| None),
                    other => other,
                }
            } else {
                generator.ensure_fresh(record).await
            };

            if let Err(e) = result {
                warn!(
                    username = %record.username,
                    kind = %generator.kind(),
                    error = %e,
                    "Failed to store generated document"
                );
            }
        }
    }

    fn validate_caller(caller_id: &str) -> Result<&str, LookupError> {
        let caller_id = caller_id.trim();
        if caller_id.is_empty() {
            return Err(LookupError::Validation(
                "Caller id cannot be empty".to_string(),
            ));
        }
        Ok(caller_id)
    }

    fn validate_conversation(messages: &[ChatMessage]) -> Result<(), ChatError> {
        if messages.is_empty() {
            return Err(ChatError::Validation(
                "Conversation must contain at least one message".to_string(),
            ));
        }
        if messages.iter().any(|m| m.role == ChatRole::System) {
            return Err(ChatError::Validation(
                "Messages must have role 'user' or 'assistant'".to_string(),
            ));
        }
        if messages.iter().any(|m| m.content.trim().is_empty()) {
            return Err(ChatError::Validation(
                "Messages cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileLookupService for SeaOrmLookupService {
    async fn ensure_profile_ready(
        &self,
        username: &Username,
    ) -> Result<ProfileRecord, LookupError> {
        let _guard = self.locks.lock(username.as_str()).await;

        let mut record = self.cache.get_or_fetch(username).await?;
        self.refresh_insights(&mut record).await;

        Ok(record)
    }

    async fn regenerate(
        &self,
        username: &Username,
        kind: Option<InsightKind>,
    ) -> Result<ProfileRecord, LookupError> {
        let _guard = self.locks.lock(username.as_str()).await;

        let mut record = self.cache.get_or_fetch(username).await?;

        for generator in &self.generators {
            if kind.is_some_and(|k| k != generator.kind()) {
                continue;
            }
            generator.force_regenerate(&mut record).await?;
        }

        Ok(record)
    }

    async fn cached(&self, username: &Username) -> Result<ProfileRecord, LookupError> {
        self.store
            .get_profile(username)
            .await?
            .ok_or_else(|| LookupError::NotFound(username.to_string()))
    }

    async fn chat(
        &self,
        username: &Username,
        persona_id: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, ChatError> {
        Self::validate_conversation(&messages)?;

        let record = self
            .store
            .get_profile(username)
            .await?
            .ok_or_else(|| ChatError::ProfileNotFound(username.to_string()))?;

        let system_prompt = record
            .persona_prompt(persona_id)
            .ok_or_else(|| ChatError::PersonaNotFound(persona_id.to_string()))?;

        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::system(system_prompt));
        conversation.extend(messages);

        let reply = self
            .llm
            .complete(&conversation, self.chat_temperature)
            .await?;

        Ok(reply.trim().to_string())
    }

    async fn record_search(
        &self,
        caller_id: &str,
        record: &ProfileRecord,
    ) -> Result<(), LookupError> {
        let caller_id = Self::validate_caller(caller_id)?;
        self.store
            .record_search(caller_id, record.id, Utc::now())
            .await?;
        Ok(())
    }

    async fn history(
        &self,
        caller_id: &str,
        limit: u64,
    ) -> Result<Vec<SearchHistoryEntry>, LookupError> {
        let caller_id = Self::validate_caller(caller_id)?;
        Ok(self.store.list_search_history(caller_id, limit).await?)
    }
}
