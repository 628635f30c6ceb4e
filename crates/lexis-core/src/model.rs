use serde::{Deserialize, Serialize};

use crate::language::{LanguageCode, LanguagePair};
use crate::preprocess::normalize_query;

pub type WordGroupId = u64;
pub type MeaningId = u64;

/// Dictionary headword with its inflected surface forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordGroup {
    pub id: WordGroupId,
    pub base_word: String,
    /// Ordered set of surface forms; always contains `base_word`
    pub word_forms: Vec<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
}

impl WordGroup {
    /// Build a group, inserting `base_word` at the front of the forms when
    /// missing and dropping duplicate forms.
    pub fn new(
        id: WordGroupId,
        base_word: impl Into<String>,
        word_forms: impl IntoIterator<Item = String>,
        part_of_speech: Option<String>,
        pair: &LanguagePair,
    ) -> Self {
        let base_word = base_word.into();
        let mut forms = vec![base_word.clone()];

        for form in word_forms {
            if !forms.contains(&form) {
                forms.push(form);
            }
        }

        Self {
            id,
            base_word,
            word_forms: forms,
            part_of_speech,
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
        }
    }

    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }

    /// Case-insensitive match on the base word or any surface form.
    /// `folded` must already be normalized.
    pub fn matches(&self, folded: &str) -> bool {
        normalize_query(&self.base_word) == folded
            || self.word_forms.iter().any(|f| normalize_query(f) == folded)
    }

    pub fn has_base_in_forms(&self) -> bool {
        self.word_forms.contains(&self.base_word)
    }
}

/// One discrete sense of a word group; the unit of tap-to-cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    pub id: MeaningId,
    pub word_group_id: WordGroupId,
    /// 1-based, dense within the owning group
    pub meaning_order: u32,
    pub target_meaning: String,
    /// Register/region tag such as "archaic" or "regional"
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub part_of_speech: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// Precomputed target-word -> source-group mapping.
///
/// For a fixed `target_word`, `lookup_order` is unique and strictly
/// increasing while `quality_score` never increases. That order is the
/// cycling sequence and is never re-ranked at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseLookupEntry {
    pub target_word: String,
    pub source_word_group_id: WordGroupId,
    pub source_meaning_id: MeaningId,
    pub lookup_order: u32,
    pub quality_score: i32,
}
