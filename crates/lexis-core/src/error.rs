use crate::language::LanguagePair;

/// Error taxonomy shared by the lookup engine, providers and the orchestrator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexisError {
    #[error("Invalid language code: '{0}'")]
    InvalidLanguageCode(String),

    #[error("No dictionary available for {0}")]
    NoDictionaryAvailable(LanguagePair),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Unsupported language pair: {from} -> {to}")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("Translation models not downloaded: {from} -> {to}")]
    ModelsNotDownloaded { from: String, to: String },

    #[error("All providers failed: {0}")]
    AllProvidersFailed(String),

    #[error("Cache IO error: {0}")]
    CacheIo(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl LexisError {
    /// Only malformed input and total failure reach the caller as errors;
    /// everything else is absorbed into fallback progression.
    pub fn is_caller_visible(&self) -> bool {
        matches!(
            self,
            LexisError::InvalidLanguageCode(_) | LexisError::AllProvidersFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageCode;

    #[test]
    fn only_invalid_code_and_total_failure_are_visible() {
        let pair = LanguagePair::new(
            LanguageCode::parse("de").unwrap(),
            LanguageCode::parse("en").unwrap(),
        );

        assert!(LexisError::InvalidLanguageCode("x".into()).is_caller_visible());
        assert!(LexisError::AllProvidersFailed("boom".into()).is_caller_visible());
        assert!(!LexisError::NoDictionaryAvailable(pair).is_caller_visible());
        assert!(!LexisError::CacheIo("disk full".into()).is_caller_visible());
        assert!(
            !LexisError::ModelsNotDownloaded {
                from: "en".into(),
                to: "de".into()
            }
            .is_caller_visible()
        );
    }

    #[test]
    fn messages_name_the_pair() {
        let pair = LanguagePair::new(
            LanguageCode::parse("en").unwrap(),
            LanguageCode::parse("de").unwrap(),
        );
        assert_eq!(
            LexisError::NoDictionaryAvailable(pair).to_string(),
            "No dictionary available for en-de"
        );
    }
}
