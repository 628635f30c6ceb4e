use std::path::{Path, PathBuf};
use std::sync::Arc;

use lexis_cache::{CachePolicy, MemoryCache};
use lexis_config::Config;
use lexis_dictionary::{DictionaryLookupEngine, LookupLimits, PackRegistry};
use lexis_engine::{OrchestratorBuilder, TranslationOrchestrator};
use lexis_translator::{RemoteTranslator, TranslationProvider};

/// Everything a command needs, wired from configuration
pub struct AppState {
    pub config: Config,
    pub dictionary: Arc<DictionaryLookupEngine>,
    pub cache: Option<Arc<MemoryCache>>,
    pub orchestrator: TranslationOrchestrator,
}

impl AppState {
    pub async fn load(config: Config) -> Self {
        let registry = Arc::new(PackRegistry::new());
        if config.dictionary.enabled {
            load_packs(&registry, &config);
        }

        let dictionary = Arc::new(
            DictionaryLookupEngine::new(registry).with_limits(LookupLimits {
                max_meanings: config.dictionary.max_meanings,
                max_reverse_results: config.dictionary.max_reverse_results,
            }),
        );

        let cache = if config.cache.enabled {
            Some(Arc::new(load_cache(&config).await))
        } else {
            None
        };

        let mut builder = OrchestratorBuilder::from_config(&config);
        if config.dictionary.enabled {
            builder = builder.dictionary(dictionary.clone());
        }
        if let Some(cache) = &cache {
            builder = builder.cache(cache.clone());
        }
        if let Some(remote) = remote_provider(&config) {
            builder = builder.remote(remote);
        }
        if config.translator.on_device_enabled {
            tracing::debug!("No on-device translation provider bundled with this build");
        }

        Self {
            orchestrator: builder.build(),
            config,
            dictionary,
            cache,
        }
    }

    pub fn cache_path(&self) -> Option<PathBuf> {
        self.config.cache.path.as_ref().map(PathBuf::from)
    }

    /// Best-effort snapshot write; failures are logged
    pub async fn persist_cache(&self) {
        let (Some(cache), Some(path)) = (&self.cache, self.cache_path()) else {
            return;
        };

        if let Err(e) = cache.save_snapshot(&path).await {
            tracing::warn!("Failed to save cache to {:?}: {}", path, e);
        }
    }
}

fn load_packs(registry: &PackRegistry, config: &Config) {
    let dir = Path::new(&config.dictionary.pack_dir);
    if dir.is_dir() {
        match registry.load_dir(dir) {
            Ok(loaded) => tracing::info!("Loaded {} packs from {:?}", loaded.len(), dir),
            Err(e) => tracing::warn!("Failed to read pack dir {:?}: {}", dir, e),
        }
    } else {
        tracing::debug!("Pack dir {:?} does not exist", dir);
    }

    for path in &config.dictionary.additional_packs {
        if let Err(e) = registry.install_from_file(Path::new(path)) {
            tracing::warn!("Failed to load pack {}: {}", path, e);
        }
    }
}

async fn load_cache(config: &Config) -> MemoryCache {
    let policy = CachePolicy::from_config(&config.cache);

    let Some(path) = &config.cache.path else {
        return MemoryCache::new(policy);
    };

    match MemoryCache::load_snapshot(Path::new(path), policy).await {
        Ok(cache) => cache,
        Err(e) => {
            tracing::warn!("Ignoring unreadable cache snapshot {}: {}", path, e);
            MemoryCache::new(policy)
        }
    }
}

fn remote_provider(config: &Config) -> Option<Arc<dyn TranslationProvider>> {
    if !config.translator.remote_enabled {
        return None;
    }

    let remote = RemoteTranslator::new(
        config.translator.remote_api_key.clone(),
        config.translator.remote_api_url.clone(),
    );

    if !remote.is_available() {
        tracing::warn!("Remote translation enabled but no API key is configured");
    }

    Some(Arc::new(remote))
}
