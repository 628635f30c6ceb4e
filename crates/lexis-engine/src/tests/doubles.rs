//! Providers and packs shared by the orchestrator tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lexis_cache::{CacheError, CacheKey, CacheStats, ResultCache};
use lexis_core::{LanguageCode, LanguagePair, TranslationResponse};
use lexis_dictionary::{DictionaryLookupEngine, PackBuilder, PackRegistry, RawEntry};
use lexis_translator::{
    OnDeviceProvider, ProviderMetadata, TranslateError, Translation, TranslationProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Error,
    RateLimited,
    /// Fail the first call, succeed afterwards
    FlakyOnce,
}

/// Counts every capability call
pub struct FakeProvider {
    pub name: &'static str,
    pub available: bool,
    pub supports: bool,
    pub downloaded: bool,
    pub reply: Reply,
    pub delay: Option<Duration>,
    pub translate_calls: AtomicUsize,
    pub model_checks: AtomicUsize,
}

impl FakeProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            available: true,
            supports: true,
            downloaded: true,
            reply: Reply::Ok,
            delay: None,
            translate_calls: AtomicUsize::new(0),
            model_checks: AtomicUsize::new(0),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supports = false;
        self
    }

    pub fn without_models(mut self) -> Self {
        self.downloaded = false;
        self
    }

    pub fn replying(mut self, reply: Reply) -> Self {
        self.reply = reply;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.translate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FakeProvider {
    fn is_available(&self) -> bool {
        self.available
    }

    fn supports_language_pair(&self, _from: &LanguageCode, _to: &LanguageCode) -> bool {
        self.supports
    }

    async fn translate_text(
        &self,
        text: &str,
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<Translation, TranslateError> {
        let call = self.translate_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.reply {
            Reply::Error => return Err(TranslateError::ApiError("boom".to_string())),
            Reply::RateLimited => return Err(TranslateError::RateLimitExceeded),
            Reply::FlakyOnce if call == 0 => {
                return Err(TranslateError::Unavailable("warming up".to_string()));
            }
            _ => {}
        }

        Ok(Translation {
            text: format!("{}:{}", self.name, text),
            from: from.clone(),
            to: to.clone(),
            provider: self.name.to_string(),
            confidence: None,
            alternatives: vec![],
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: self.name.to_string(),
            requires_api_key: false,
            free_tier_available: true,
        }
    }
}

#[async_trait]
impl OnDeviceProvider for FakeProvider {
    async fn are_models_downloaded(&self, _from: &LanguageCode, _to: &LanguageCode) -> bool {
        self.model_checks.fetch_add(1, Ordering::SeqCst);
        self.downloaded
    }
}

/// Never stores anything; every write fails with an IO error
#[derive(Default)]
pub struct FailingCache {
    pub puts: AtomicUsize,
}

#[async_trait]
impl ResultCache for FailingCache {
    async fn get(&self, _key: &CacheKey) -> Option<TranslationResponse> {
        None
    }

    async fn put(&self, _key: CacheKey, _response: TranslationResponse) -> Result<(), CacheError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Io(std::io::Error::other("disk full")))
    }

    async fn purge_older_than(&self, _max_age: chrono::Duration) -> usize {
        0
    }

    async fn len(&self) -> usize {
        0
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

/// es-en with "agua"; de-en with two equally ranked "home" sources
pub fn dictionary() -> Arc<DictionaryLookupEngine> {
    let registry = Arc::new(PackRegistry::new());

    let (es_en, _) = PackBuilder::new(LanguagePair::parse("es", "en").unwrap()).build(vec![
        RawEntry::new("agua", "water | body of water | rain").with_pos("noun"),
        RawEntry::new("casa", "house; home").with_pos("noun"),
    ]);
    let (de_en, _) = PackBuilder::new(LanguagePair::parse("de", "en").unwrap()).build(vec![
        RawEntry::new("Haus", "house; building").with_pos("noun"),
        RawEntry::new("Zuhause", "home").with_pos("noun"),
        RawEntry::new("Heim", "home").with_pos("noun"),
    ]);

    registry.install(es_en).unwrap();
    registry.install(de_en).unwrap();

    Arc::new(DictionaryLookupEngine::new(registry))
}
