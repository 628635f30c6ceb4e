use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lexis_core::{
    LanguageCode, LexisError, MeaningCandidate, Outcome, ProviderSource, TranslationRequest,
};
use lexis_dictionary::DictionaryLookupEngine;
use lexis_translator::{OnDeviceProvider, TranslateError, Translation, TranslationProvider};

/// What every tier sees for one request
pub struct TierContext<'a> {
    pub request: &'a TranslationRequest,
    pub source: &'a LanguageCode,
    pub target: &'a LanguageCode,
    pub single_word: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    Hit {
        source: ProviderSource,
        outcome: Outcome,
        text: String,
        candidates: Vec<MeaningCandidate>,
    },
    /// Tier does not apply to this request
    Skip(String),
    /// Tier was attempted and failed; the next one runs
    Fail(String),
    /// Terminal without success; later tiers are not attempted
    Stop { outcome: Outcome, error: String },
}

/// One stage of the fallback pipeline
#[async_trait]
pub trait Tier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, ctx: &TierContext<'_>) -> TierOutcome;
}

/// Run a provider call under `limit`; elapsing counts as a provider error
pub async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, TranslateError>>,
) -> Result<T, TranslateError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(elapsed(limit)),
    }
}

fn elapsed(limit: Duration) -> TranslateError {
    TranslateError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
}

fn translated(
    result: Result<Translation, TranslateError>,
    source: ProviderSource,
    outcome: Outcome,
) -> TierOutcome {
    match result {
        Ok(t) if t.text.trim().is_empty() => TierOutcome::Fail("empty translation".to_string()),
        Ok(t) => TierOutcome::Hit {
            source,
            outcome,
            text: t.text,
            candidates: Vec::new(),
        },
        Err(e) => TierOutcome::Fail(e.to_string()),
    }
}

/// Why a provider cannot take this request, if it cannot
fn unusable<P: TranslationProvider + ?Sized>(provider: &P, ctx: &TierContext<'_>) -> Option<String> {
    let reason = if !provider.is_available() {
        LexisError::ProviderUnavailable(provider.metadata().name)
    } else if !provider.supports_language_pair(ctx.source, ctx.target) {
        LexisError::UnsupportedLanguagePair {
            from: ctx.source.to_string(),
            to: ctx.target.to_string(),
        }
    } else {
        return None;
    };
    Some(reason.to_string())
}

pub struct DictionaryTier {
    engine: Arc<DictionaryLookupEngine>,
}

impl DictionaryTier {
    pub fn new(engine: Arc<DictionaryLookupEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tier for DictionaryTier {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    async fn attempt(&self, ctx: &TierContext<'_>) -> TierOutcome {
        if !ctx.single_word {
            return TierOutcome::Skip("multi-word input".to_string());
        }

        let lookup = match self
            .engine
            .lookup(&ctx.request.text, ctx.source.as_str(), ctx.target.as_str())
        {
            Ok(lookup) => lookup,
            Err(e) => return TierOutcome::Fail(e.to_string()),
        };

        let candidates: Vec<MeaningCandidate> = if lookup.meanings.has_results() {
            lookup.meanings.meanings
        } else {
            lookup
                .reverse
                .map(|r| r.translations.into_iter().map(MeaningCandidate::from).collect())
                .unwrap_or_default()
        };

        match candidates.first() {
            Some(first) => TierOutcome::Hit {
                source: ProviderSource::Dictionary,
                outcome: Outcome::DictionaryHit,
                text: first.translation.clone(),
                candidates,
            },
            None => TierOutcome::Fail("no dictionary match".to_string()),
        }
    }
}

pub struct OnDeviceTier {
    provider: Arc<dyn OnDeviceProvider>,
    timeout: Duration,
}

impl OnDeviceTier {
    pub fn new(provider: Arc<dyn OnDeviceProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait]
impl Tier for OnDeviceTier {
    fn name(&self) -> &'static str {
        "on_device"
    }

    async fn attempt(&self, ctx: &TierContext<'_>) -> TierOutcome {
        if let Some(reason) = unusable(self.provider.as_ref(), ctx) {
            return TierOutcome::Skip(reason);
        }

        let downloaded = with_timeout(self.timeout, async {
            Ok(self.provider.are_models_downloaded(ctx.source, ctx.target).await)
        })
        .await;

        match downloaded {
            Ok(true) => {}
            Ok(false) => {
                return TierOutcome::Stop {
                    outcome: Outcome::ModelsNotDownloaded,
                    error: LexisError::ModelsNotDownloaded {
                        from: ctx.source.to_string(),
                        to: ctx.target.to_string(),
                    }
                    .to_string(),
                };
            }
            Err(e) => return TierOutcome::Fail(e.to_string()),
        }

        let result = with_timeout(
            self.timeout,
            self.provider
                .translate_text(ctx.request.text.trim(), ctx.source, ctx.target),
        )
        .await;

        translated(result, ProviderSource::OnDeviceModel, Outcome::OnDeviceHit)
    }
}

pub struct RemoteTier {
    provider: Arc<dyn TranslationProvider>,
    timeout: Duration,
}

impl RemoteTier {
    pub fn new(provider: Arc<dyn TranslationProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }
}

#[async_trait]
impl Tier for RemoteTier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn attempt(&self, ctx: &TierContext<'_>) -> TierOutcome {
        if let Some(reason) = unusable(self.provider.as_ref(), ctx) {
            return TierOutcome::Skip(reason);
        }

        let result = with_timeout(
            self.timeout,
            self.provider
                .translate_text(ctx.request.text.trim(), ctx.source, ctx.target),
        )
        .await;

        translated(result, ProviderSource::RemoteService, Outcome::RemoteHit)
    }
}
