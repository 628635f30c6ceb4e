use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::language::LanguageCode;
use crate::model::{MeaningId, WordGroupId};

/// Which tier produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSource {
    Dictionary,
    OnDeviceModel,
    RemoteService,
    Cache,
}

/// Terminal state of one `translate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    CacheHit,
    DictionaryHit,
    OnDeviceHit,
    RemoteHit,
    /// On-device tier supports the pair but its assets are missing.
    /// The pipeline stops here so the caller can offer a download.
    ModelsNotDownloaded,
    AllFailed,
    /// Malformed request (bad language code); no tier was attempted
    Rejected,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Outcome::CacheHit | Outcome::DictionaryHit | Outcome::OnDeviceHit | Outcome::RemoteHit
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupDirection {
    Direct,
    Reverse,
}

/// Which installed dictionary serves a requested pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionResolution {
    pub dict_source: LanguageCode,
    pub dict_target: LanguageCode,
    pub use_reverse: bool,
}

impl DirectionResolution {
    pub fn direction(&self) -> LookupDirection {
        if self.use_reverse {
            LookupDirection::Reverse
        } else {
            LookupDirection::Direct
        }
    }
}

/// One cyclable candidate returned by `lookup_meanings`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeaningCandidate {
    pub word_group_id: WordGroupId,
    pub meaning_id: MeaningId,
    /// Headword of the owning word group
    pub base_word: String,
    /// Text shown to the user: the meaning for direct lookups, the source
    /// headword for reverse lookups
    pub translation: String,
    pub context: Option<String>,
    pub part_of_speech: Option<String>,
    pub is_primary: bool,
    /// Position within the owning word group. Strictly increasing per
    /// `word_group_id`; restarts at each homograph group.
    pub meaning_order: u32,
    /// Set for reverse lookups only
    pub lookup_order: Option<u32>,
    /// 1-based cycling position
    pub current_index: usize,
    pub total_meanings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeaningLookupResult {
    pub query: String,
    pub source_language: String,
    pub target_language: String,
    pub direction: Option<LookupDirection>,
    pub meanings: Vec<MeaningCandidate>,
    pub latency: Duration,
    pub from_cache: bool,
}

impl MeaningLookupResult {
    pub fn empty(query: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            query: query.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            direction: None,
            meanings: Vec::new(),
            latency: Duration::ZERO,
            from_cache: false,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.meanings.is_empty()
    }
}

/// One target -> source candidate returned by `lookup_reverse_translations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseCandidate {
    pub word_group_id: WordGroupId,
    pub meaning_id: MeaningId,
    /// Source-language headword surfaced as the translation
    pub source_word: String,
    /// The sense of `source_word` that produced this entry
    pub meaning: String,
    pub part_of_speech: Option<String>,
    pub context: Option<String>,
    pub lookup_order: u32,
    pub quality_score: i32,
    pub current_index: usize,
    pub total: usize,
}

/// Reverse results flattened into the candidate list of a translation
/// response; cycling order follows `lookup_order`.
impl From<ReverseCandidate> for MeaningCandidate {
    fn from(candidate: ReverseCandidate) -> Self {
        Self {
            word_group_id: candidate.word_group_id,
            meaning_id: candidate.meaning_id,
            base_word: candidate.source_word.clone(),
            translation: candidate.source_word,
            context: candidate.context,
            part_of_speech: candidate.part_of_speech,
            is_primary: candidate.current_index == 1,
            meaning_order: candidate.lookup_order,
            lookup_order: Some(candidate.lookup_order),
            current_index: candidate.current_index,
            total_meanings: candidate.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseLookupResult {
    pub query: String,
    pub source_language: String,
    pub target_language: String,
    pub translations: Vec<ReverseCandidate>,
    pub latency: Duration,
    pub from_cache: bool,
}

impl ReverseLookupResult {
    pub fn empty(query: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            query: query.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            translations: Vec::new(),
            latency: Duration::ZERO,
            from_cache: false,
        }
    }

    pub fn has_results(&self) -> bool {
        !self.translations.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub id: Uuid,
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    pub timestamp: DateTime<Utc>,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Transient result of one `translate` call; successful non-cache
/// responses are stored in the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    pub translated_text: Option<String>,
    #[serde(default)]
    pub candidate_meanings: Vec<MeaningCandidate>,
    pub provider_source: Option<ProviderSource>,
    pub outcome: Outcome,
    pub latency: Duration,
    pub success: bool,
    pub error: Option<String>,
}

impl TranslationResponse {
    pub fn hit(
        request: &TranslationRequest,
        source: ProviderSource,
        outcome: Outcome,
        translated_text: String,
        candidate_meanings: Vec<MeaningCandidate>,
        latency: Duration,
    ) -> Self {
        Self {
            text: request.text.clone(),
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
            translated_text: Some(translated_text),
            candidate_meanings,
            provider_source: Some(source),
            outcome,
            latency,
            success: true,
            error: None,
        }
    }

    pub fn failure(
        request: &TranslationRequest,
        outcome: Outcome,
        error: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            text: request.text.clone(),
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
            translated_text: None,
            candidate_meanings: Vec::new(),
            provider_source: None,
            outcome,
            latency,
            success: false,
            error: Some(error.into()),
        }
    }

    /// Copy of a stored response as served from the cache
    pub fn from_cache(&self, latency: Duration) -> Self {
        Self {
            provider_source: Some(ProviderSource::Cache),
            outcome: Outcome::CacheHit,
            latency,
            ..self.clone()
        }
    }

    pub fn is_cache_sourced(&self) -> bool {
        self.provider_source == Some(ProviderSource::Cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_copy_keeps_payload() {
        let request = TranslationRequest::new("agua", "es", "en");
        let response = TranslationResponse::hit(
            &request,
            ProviderSource::Dictionary,
            Outcome::DictionaryHit,
            "water".into(),
            Vec::new(),
            Duration::from_millis(3),
        );

        let cached = response.from_cache(Duration::from_micros(5));

        assert!(cached.is_cache_sourced());
        assert_eq!(cached.outcome, Outcome::CacheHit);
        assert_eq!(cached.translated_text.as_deref(), Some("water"));
        assert_eq!(cached.latency, Duration::from_micros(5));
        assert!(!response.is_cache_sourced());
    }

    #[test]
    fn failures_are_not_successes() {
        let request = TranslationRequest::new("x y", "en", "de");
        let response = TranslationResponse::failure(
            &request,
            Outcome::AllFailed,
            "no provider",
            Duration::ZERO,
        );

        assert!(!response.success);
        assert!(!response.outcome.is_success());
        assert_eq!(response.error.as_deref(), Some("no provider"));
    }

    #[test]
    fn serializes_provider_source_in_snake_case() {
        let json = serde_json::to_string(&ProviderSource::OnDeviceModel).unwrap();
        assert_eq!(json, "\"on_device_model\"");
    }
}
