use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::cache::CacheConfig;
use self::dictionary::DictionaryConfig;
use self::logging::LoggingConfig;
use self::orchestrator::OrchestratorConfig;
use self::translator::TranslatorConfig;

pub mod cache;
pub mod dictionary;
pub mod logging;
pub mod orchestrator;
pub mod translator;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dictionary: DictionaryConfig,
    pub translator: TranslatorConfig,
    pub cache: CacheConfig,
    pub orchestrator: OrchestratorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

impl Config {
    /// Defaults with environment overrides applied
    pub fn new() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Read a JSON config file, falling back to defaults when it does not
    /// exist. Environment overrides are applied on top either way.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            tracing::info!("Loading config from {}", path.display());
            let data = fs::read_to_string(path)?;
            serde_json::from_str(&data)?
        } else {
            tracing::warn!("Config {} not found, using defaults", path.display());
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = env::var("LEXIS_PACK_DIR") {
            self.dictionary.pack_dir = dir;
        }

        if let Ok(path) = env::var("LEXIS_CACHE_PATH") {
            self.cache.path = Some(path);
        }

        if let Ok(key) = env::var("LEXIS_REMOTE_API_KEY") {
            self.translator.remote_api_key = key;
        }

        if let Ok(url) = env::var("LEXIS_REMOTE_API_URL") {
            self.translator.remote_api_url = url;
        }

        if let Some(timeout) = env::var("LEXIS_PROVIDER_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.translator.provider_timeout_ms = timeout;
        }

        if let Ok(level) = env::var("LEXIS_LOG_LEVEL") {
            self.logging.level = level;
        }
    }
}
