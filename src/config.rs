use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable consulted when `search_api.api_key` is empty.
pub const SEARCH_API_KEY_ENV: &str = "SEARCH_API_KEY";

/// Environment variable consulted when `llm.api_key` is empty.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub search_api: SearchApiConfig,

    pub llm: LlmConfig,

    pub cache: CacheConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/glimpse.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchApiConfig {
    pub base_url: String,

    pub engine: String,

    pub api_key: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,
}

impl Default for SearchApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.searchapi.io/api/v1/search".to_string(),
            engine: "instagram_profile".to_string(),
            api_key: String::new(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,

    pub api_key: String,

    pub model: String,

    /// Generation can take minutes for the longer prompts (default: 180)
    pub request_timeout_seconds: u64,

    pub insights_temperature: f32,

    pub strategy_temperature: f32,

    pub personas_temperature: f32,

    pub chat_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            request_timeout_seconds: 180,
            insights_temperature: 0.7,
            strategy_temperature: 0.7,
            personas_temperature: 0.8,
            chat_temperature: 0.8,
        }
    }
}

const MAX_PROFILE_TTL_MINUTES: i64 = 60 * 24 * 365;
const MAX_INSIGHTS_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Raw profile snapshot staleness window (default: 60)
    pub profile_ttl_minutes: i64,

    /// AI-derived data staleness window (default: 24)
    pub insights_ttl_hours: i64,

    /// How many recent posts are summarized into generator prompts
    pub max_posts_in_prompt: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            profile_ttl_minutes: 60,
            insights_ttl_hours: 24,
            max_posts_in_prompt: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6790,
            cors_allowed_origins: vec![
                "http://localhost:6790".to_string(),
                "http://127.0.0.1:6790".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            search_api: SearchApiConfig::default(),
            llm: LlmConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is the normal case outside development.
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_credentials(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Fills empty API keys from the environment. Keys set in the file win.
    pub fn apply_env_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.search_api.api_key.is_empty()
            && let Some(key) = lookup(SEARCH_API_KEY_ENV)
        {
            self.search_api.api_key = key;
        }

        if self.llm.api_key.is_empty()
            && let Some(key) = lookup(OPENAI_API_KEY_ENV)
        {
            self.llm.api_key = key;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("glimpse").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".glimpse").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search_api.base_url.is_empty() {
            anyhow::bail!("Search API base URL cannot be empty");
        }

        if self.llm.base_url.is_empty() {
            anyhow::bail!("LLM base URL cannot be empty");
        }

        if self.cache.profile_ttl_minutes <= 0 || self.cache.insights_ttl_hours <= 0 {
            anyhow::bail!("Cache staleness windows must be > 0");
        }

        if self.cache.profile_ttl_minutes > MAX_PROFILE_TTL_MINUTES {
            anyhow::bail!(
                "cache.profile_ttl_minutes must be at most {MAX_PROFILE_TTL_MINUTES} (one year)"
            );
        }

        if self.cache.insights_ttl_hours > MAX_INSIGHTS_TTL_HOURS {
            anyhow::bail!(
                "cache.insights_ttl_hours must be at most {MAX_INSIGHTS_TTL_HOURS} (one year)"
            );
        }

        if self.server.enabled && self.server.port == 0 {
            anyhow::bail!("Server port must be set when the server is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache.profile_ttl_minutes, 60);
        assert_eq!(config.cache.insights_ttl_hours, 24);
        assert_eq!(config.search_api.engine, "instagram_profile");
        assert_eq!(config.llm.request_timeout_seconds, 180);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[search_api]"));
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[cache]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [cache]
            profile_ttl_minutes = 30
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.cache.profile_ttl_minutes, 30);

        assert_eq!(config.cache.insights_ttl_hours, 24);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn env_credentials_fill_only_empty_keys() {
        let mut config = Config::default();
        config.llm.api_key = "from-file".to_string();

        config.apply_env_credentials(|key| match key {
            SEARCH_API_KEY_ENV => Some("search-env".to_string()),
            OPENAI_API_KEY_ENV => Some("openai-env".to_string()),
            _ => None,
        });

        assert_eq!(config.search_api.api_key, "search-env");
        assert_eq!(config.llm.api_key, "from-file");
    }

    #[test]
    fn validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.insights_ttl_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_ttl() {
        let mut config = Config::default();
        config.cache.profile_ttl_minutes = MAX_PROFILE_TTL_MINUTES;
        config.cache.insights_ttl_hours = MAX_INSIGHTS_TTL_HOURS;
        assert!(config.validate().is_ok());

        config.cache.profile_ttl_minutes = i64::MAX;
        assert!(config.validate().is_err());

        config.cache.profile_ttl_minutes = 60;
        config.cache.insights_ttl_hours = MAX_INSIGHTS_TTL_HOURS + 1;
        assert!(config.validate().is_err());
    }
}
