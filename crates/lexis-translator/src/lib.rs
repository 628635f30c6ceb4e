pub mod remote;

use lexis_core::LanguageCode;

pub use remote::RemoteTranslator;

/// Translation provider capability surface
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Checked per request; a provider that failed earlier is asked again
    fn is_available(&self) -> bool;

    fn supports_language_pair(&self, from: &LanguageCode, to: &LanguageCode) -> bool;

    /// Translate text from source to target language
    async fn translate_text(
        &self,
        text: &str,
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<Translation, TranslateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

/// A provider running locally against downloadable model assets
#[async_trait::async_trait]
pub trait OnDeviceProvider: TranslationProvider {
    async fn are_models_downloaded(&self, from: &LanguageCode, to: &LanguageCode) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub provider: String,
    pub confidence: Option<f32>,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
    pub free_tier_available: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Unsupported language pair: {from} -> {to}")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Authentication error")]
    AuthenticationError,

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}
