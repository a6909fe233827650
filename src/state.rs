use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::{LlmClient, OpenAiClient, ProfileFetcher, SearchApiClient};
use crate::config::Config;
use crate::db::Store;
use crate::services::{ProfileLookupService, SeaOrmLookupService};

/// Build a shared HTTP client for the short-timeout upstream calls.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Glimpse/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub lookup_service: Arc<dyn ProfileLookupService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.search_api.request_timeout_seconds)?;

        let fetcher = Arc::new(SearchApiClient::with_shared_client(
            http_client,
            &config.search_api,
        )) as Arc<dyn ProfileFetcher>;

        // Completions get their own client for the much longer timeout.
        let llm = Arc::new(OpenAiClient::new(&config.llm)?) as Arc<dyn LlmClient>;

        Self::with_clients(config, fetcher, llm).await
    }

    /// Builds the state around caller-supplied upstream clients.
    pub async fn with_clients(
        config: Config,
        fetcher: Arc<dyn ProfileFetcher>,
        llm: Arc<dyn LlmClient>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let lookup_service = Arc::new(SeaOrmLookupService::new(
            store.clone(),
            fetcher,
            llm,
            &config,
        )) as Arc<dyn ProfileLookupService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            lookup_service,
        })
    }
}
