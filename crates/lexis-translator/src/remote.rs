use async_trait::async_trait;
use lexis_core::LanguageCode;

use crate::{ProviderMetadata, TranslateError, Translation, TranslationProvider};

/// Target languages accepted by the DeepL-compatible endpoint
const SUPPORTED_LANGUAGES: [&str; 30] = [
    "ar", "bg", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr", "hu", "id", "it", "ja",
    "ko", "lt", "lv", "nb", "nl", "pl", "pt", "ro", "ru", "sk", "sl", "sv", "tr", "uk", "zh",
];

/// HTTP client for a DeepL-style translation API
#[derive(Clone)]
pub struct RemoteTranslator {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl RemoteTranslator {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }
}

/// Pull `translations[0].text` out of a response body
fn parse_translation(json: &serde_json::Value) -> Result<&str, TranslateError> {
    json["translations"]
        .get(0)
        .and_then(|t| t["text"].as_str())
        .ok_or_else(|| TranslateError::ApiError("No translation in response".to_string()))
}

#[async_trait]
impl TranslationProvider for RemoteTranslator {
    fn is_available(&self) -> bool {
        !self.api_key.is_empty() && !self.api_url.is_empty()
    }

    fn supports_language_pair(&self, from: &LanguageCode, to: &LanguageCode) -> bool {
        from != to
            && SUPPORTED_LANGUAGES.contains(&from.as_str())
            && SUPPORTED_LANGUAGES.contains(&to.as_str())
    }

    async fn translate_text(
        &self,
        text: &str,
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<Translation, TranslateError> {
        if self.api_key.is_empty() {
            return Err(TranslateError::AuthenticationError);
        }

        if !self.supports_language_pair(from, to) {
            return Err(TranslateError::UnsupportedLanguagePair {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let source_lang = from.as_str().to_uppercase();
        let target_lang = to.as_str().to_uppercase();
        let params = [
            ("text", text),
            ("source_lang", source_lang.as_str()),
            ("target_lang", target_lang.as_str()),
        ];

        tracing::debug!("Remote translate {} -> {} ({} chars)", from, to, text.len());

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .form(&params)
            .send()
            .await?;

        if let Some(err) = status_error(response.status()) {
            return Err(err);
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            TranslateError::ApiError(format!("Failed to parse response: {}", e))
        })?;

        let translated_text = parse_translation(&json)?;

        Ok(Translation {
            text: translated_text.to_string(),
            from: from.clone(),
            to: to.clone(),
            provider: "deepl".to_string(),
            confidence: None,
            alternatives: vec![],
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "DeepL".to_string(),
            requires_api_key: true,
            free_tier_available: true,
        }
    }
}

fn status_error(status: reqwest::StatusCode) -> Option<TranslateError> {
    match status.as_u16() {
        _ if status.is_success() => None,
        429 => Some(TranslateError::RateLimitExceeded),
        403 => Some(TranslateError::AuthenticationError),
        _ if status.is_server_error() => {
            Some(TranslateError::Unavailable(format!("HTTP {}", status)))
        }
        _ => Some(TranslateError::ApiError(format!("HTTP {}", status))),
    }
}
