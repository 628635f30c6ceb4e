use std::sync::Arc;
use std::time::{Duration, Instant};

use lexis_cache::{CacheKey, ResultCache};
use lexis_config::Config;
use lexis_core::preprocess::{DEFAULT_SINGLE_WORD_MAX_CHARS, is_single_word, normalize_query};
use lexis_core::{LanguagePair, LexisError, Outcome, TranslationRequest, TranslationResponse};
use lexis_dictionary::DictionaryLookupEngine;
use lexis_translator::{OnDeviceProvider, TranslationProvider};
use tokio_util::sync::CancellationToken;

use crate::tier::{DictionaryTier, OnDeviceTier, RemoteTier, Tier, TierContext, TierOutcome};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_millis(5000);

/// Assembles the pipeline; tiers always run dictionary, on-device, remote
/// regardless of the order they are supplied in.
pub struct OrchestratorBuilder {
    dictionary: Option<Arc<DictionaryLookupEngine>>,
    on_device: Option<Arc<dyn OnDeviceProvider>>,
    remote: Option<Arc<dyn TranslationProvider>>,
    cache: Option<Arc<dyn ResultCache>>,
    provider_timeout: Duration,
    single_word_max_chars: usize,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self {
            dictionary: None,
            on_device: None,
            remote: None,
            cache: None,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            single_word_max_chars: DEFAULT_SINGLE_WORD_MAX_CHARS,
        }
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeout and single-word ceiling from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider_timeout: Duration::from_millis(config.translator.provider_timeout_ms),
            single_word_max_chars: config.orchestrator.single_word_max_chars,
            ..Self::default()
        }
    }

    pub fn dictionary(mut self, engine: Arc<DictionaryLookupEngine>) -> Self {
        self.dictionary = Some(engine);
        self
    }

    pub fn on_device(mut self, provider: Arc<dyn OnDeviceProvider>) -> Self {
        self.on_device = Some(provider);
        self
    }

    pub fn remote(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.remote = Some(provider);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn single_word_max_chars(mut self, max_chars: usize) -> Self {
        self.single_word_max_chars = max_chars;
        self
    }

    pub fn build(self) -> TranslationOrchestrator {
        let mut tiers: Vec<Box<dyn Tier>> = Vec::new();

        if let Some(engine) = &self.dictionary {
            tiers.push(Box::new(DictionaryTier::new(engine.clone())));
        }
        if let Some(provider) = self.on_device {
            tiers.push(Box::new(OnDeviceTier::new(provider, self.provider_timeout)));
        }
        if let Some(provider) = self.remote {
            tiers.push(Box::new(RemoteTier::new(provider, self.provider_timeout)));
        }

        tracing::debug!(
            "Translation pipeline: [{}]",
            tiers.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
        );

        TranslationOrchestrator {
            tiers,
            dictionary: self.dictionary,
            cache: self.cache,
            single_word_max_chars: self.single_word_max_chars,
        }
    }
}

/// Resolves text through cache, dictionary, on-device and remote tiers.
///
/// `translate` is total: every failure becomes a response with a
/// non-success outcome, never an error.
pub struct TranslationOrchestrator {
    tiers: Vec<Box<dyn Tier>>,
    dictionary: Option<Arc<DictionaryLookupEngine>>,
    cache: Option<Arc<dyn ResultCache>>,
    single_word_max_chars: usize,
}

impl TranslationOrchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Lookup engine for callers that want raw cyclable candidates
    pub fn dictionary(&self) -> Option<&Arc<DictionaryLookupEngine>> {
        self.dictionary.as_ref()
    }

    pub fn cache(&self) -> Option<&Arc<dyn ResultCache>> {
        self.cache.as_ref()
    }

    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        use_cache: bool,
    ) -> TranslationResponse {
        self.translate_with_cancel(
            text,
            source_language,
            target_language,
            use_cache,
            &CancellationToken::new(),
        )
        .await
    }

    /// Cancellation is cooperative: a dispatched tier call is awaited, then
    /// its result is discarded.
    pub async fn translate_with_cancel(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
        use_cache: bool,
        cancel: &CancellationToken,
    ) -> TranslationResponse {
        let started = Instant::now();
        let request = TranslationRequest::new(text, source_language, target_language);

        let pair = match LanguagePair::parse(source_language, target_language) {
            Ok(pair) => pair,
            Err(e) => return failed(&request, Outcome::Rejected, e, started),
        };

        if normalize_query(text).is_empty() {
            return all_failed(&request, "empty input", started);
        }

        tracing::debug!("Translate {} ({}): {:?}", request.id, pair, text);

        let key = CacheKey::new(text, pair.source.as_str(), pair.target.as_str());
        let cache = self.cache.as_ref().filter(|_| use_cache);

        if let Some(cache) = cache {
            if let Some(hit) = cache.get(&key).await {
                tracing::debug!("Cache hit for {}", request.id);
                return hit;
            }
        }

        let ctx = TierContext {
            request: &request,
            source: &pair.source,
            target: &pair.target,
            single_word: is_single_word(text, self.single_word_max_chars),
        };

        let mut last_error: Option<String> = None;

        for tier in &self.tiers {
            if cancel.is_cancelled() {
                return all_failed(&request, "cancelled", started);
            }

            let outcome = tier.attempt(&ctx).await;

            if cancel.is_cancelled() {
                tracing::debug!(
                    "Discarding {} result for cancelled {}",
                    tier.name(),
                    request.id
                );
                return all_failed(&request, "cancelled", started);
            }

            match outcome {
                TierOutcome::Hit {
                    source,
                    outcome,
                    text,
                    candidates,
                } => {
                    let response = TranslationResponse::hit(
                        &request,
                        source,
                        outcome,
                        text,
                        candidates,
                        started.elapsed(),
                    );
                    tracing::debug!(
                        "{} resolved {} in {:?}",
                        tier.name(),
                        request.id,
                        response.latency
                    );

                    if let Some(cache) = cache {
                        if let Err(e) = cache.put(key, response.clone()).await {
                            tracing::warn!("Failed to cache {}: {}", request.id, LexisError::from(e));
                        }
                    }
                    return response;
                }
                TierOutcome::Skip(reason) => {
                    tracing::debug!("{} skipped: {}", tier.name(), reason);
                }
                TierOutcome::Fail(reason) => {
                    tracing::debug!("{} failed: {}", tier.name(), reason);
                    last_error = Some(format!("{}: {}", tier.name(), reason));
                }
                TierOutcome::Stop { outcome, error } => {
                    tracing::info!("{} stopped the pipeline: {}", tier.name(), error);
                    return TranslationResponse::failure(
                        &request,
                        outcome,
                        error,
                        started.elapsed(),
                    );
                }
            }
        }

        let cause = last_error
            .unwrap_or_else(|| "no translation tier could handle the request".to_string());
        all_failed(&request, &cause, started)
    }
}

fn failed(
    request: &TranslationRequest,
    outcome: Outcome,
    err: LexisError,
    started: Instant,
) -> TranslationResponse {
    if err.is_caller_visible() {
        tracing::warn!("Request {} failed: {}", request.id, err);
    } else {
        tracing::debug!("Request {} ended: {}", request.id, err);
    }
    TranslationResponse::failure(request, outcome, err.to_string(), started.elapsed())
}

fn all_failed(request: &TranslationRequest, cause: &str, started: Instant) -> TranslationResponse {
    failed(
        request,
        Outcome::AllFailed,
        LexisError::AllProvidersFailed(cause.to_string()),
        started,
    )
}
