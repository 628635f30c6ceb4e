use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use lexis_core::preprocess::normalize_query;
use lexis_core::{
    DirectionResolution, LanguagePair, LexisError, LookupDirection, MeaningCandidate,
    MeaningLookupResult, ReverseCandidate, ReverseLookupResult,
};

use crate::registry::DictionarySource;
use crate::store::PackStore;

pub const DEFAULT_MAX_MEANINGS: usize = 10;
pub const DEFAULT_MAX_REVERSE_RESULTS: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct LookupLimits {
    pub max_meanings: usize,
    pub max_reverse_results: usize,
}

impl Default for LookupLimits {
    fn default() -> Self {
        Self {
            max_meanings: DEFAULT_MAX_MEANINGS,
            max_reverse_results: DEFAULT_MAX_REVERSE_RESULTS,
        }
    }
}

/// Installed pairs, valid while the source generation is unchanged
struct PairAvailability {
    generation: u64,
    pairs: HashSet<LanguagePair>,
}

/// Result of the combined dictionary lookup used by the fallback pipeline
#[derive(Debug, Clone)]
pub struct DictionaryLookup {
    pub meanings: MeaningLookupResult,
    pub reverse: Option<ReverseLookupResult>,
}

impl DictionaryLookup {
    pub fn has_results(&self) -> bool {
        self.meanings.has_results() || self.reverse.as_ref().is_some_and(|r| r.has_results())
    }
}

/// Resolves words against installed packs, in either direction.
///
/// Ranking happens when packs are built; lookups trust `meaning_order` and
/// `lookup_order` verbatim.
pub struct DictionaryLookupEngine {
    source: Arc<dyn DictionarySource>,
    availability: RwLock<Option<PairAvailability>>,
    limits: LookupLimits,
}

impl DictionaryLookupEngine {
    pub fn new(source: Arc<dyn DictionarySource>) -> Self {
        Self {
            source,
            availability: RwLock::new(None),
            limits: LookupLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: LookupLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Drop the cached pair set; the next lookup recomputes it
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.availability.write() {
            *cached = None;
        }
    }

    /// Installed pairs, recomputed only when the pack set changed
    pub fn available_pairs(&self) -> Result<HashSet<LanguagePair>, LexisError> {
        let generation = self.source.generation();

        {
            let cached = self.availability.read().map_err(|_| poisoned())?;
            if let Some(cached) = cached.as_ref().filter(|c| c.generation == generation) {
                return Ok(cached.pairs.clone());
            }
        }

        let pairs: HashSet<LanguagePair> = self.source.installed_pairs()?.into_iter().collect();
        tracing::debug!(
            "Recomputed language pair availability (generation {generation}, {} pairs)",
            pairs.len()
        );

        let mut cached = self.availability.write().map_err(|_| poisoned())?;
        *cached = Some(PairAvailability {
            generation,
            pairs: pairs.clone(),
        });

        Ok(pairs)
    }

    /// Pick the installed dictionary serving `source -> target`: the direct
    /// pack when present, otherwise the inverse pack in reverse mode.
    pub fn resolve_direction(
        &self,
        source: &str,
        target: &str,
    ) -> Result<DirectionResolution, LexisError> {
        let requested = LanguagePair::parse(source, target)?;
        let pairs = self.available_pairs()?;

        if pairs.contains(&requested) {
            return Ok(DirectionResolution {
                dict_source: requested.source,
                dict_target: requested.target,
                use_reverse: false,
            });
        }

        let inverse = requested.inverse();
        if pairs.contains(&inverse) {
            return Ok(DirectionResolution {
                dict_source: inverse.source,
                dict_target: inverse.target,
                use_reverse: true,
            });
        }

        Err(LexisError::NoDictionaryAvailable(requested))
    }

    /// Ordered, cyclable meanings of `word`.
    ///
    /// Empty input yields an empty zero-latency result. Malformed language
    /// codes fail fast; every other failure degrades to an empty result.
    pub fn lookup_meanings(
        &self,
        word: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<MeaningLookupResult, LexisError> {
        let folded = normalize_query(word);
        if folded.is_empty() {
            return Ok(MeaningLookupResult::empty(word, source_language, target_language));
        }

        LanguagePair::parse(source_language, target_language)?;

        let started = Instant::now();
        let mut result = MeaningLookupResult::empty(&folded, source_language, target_language);

        match self.collect_meanings(&folded, source_language, target_language) {
            Ok((direction, meanings)) => {
                result.direction = Some(direction);
                result.meanings = meanings;
            }
            Err(LexisError::NoDictionaryAvailable(pair)) => {
                tracing::debug!("No dictionary for {pair}, lookup of '{folded}' is empty");
            }
            Err(e) => {
                tracing::warn!("Dictionary lookup for '{folded}' failed: {e}");
            }
        }

        result.latency = started.elapsed();
        tracing::debug!(
            "lookup_meanings('{folded}', {source_language}->{target_language}): {} meanings in {:?}",
            result.meanings.len(),
            result.latency
        );

        Ok(result)
    }

    /// Target -> source candidates from the reverse index of the
    /// `target_language -> source_language` pack, in `lookup_order`.
    pub fn lookup_reverse_translations(
        &self,
        word: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<ReverseLookupResult, LexisError> {
        let folded = normalize_query(word);
        if folded.is_empty() {
            return Ok(ReverseLookupResult::empty(word, source_language, target_language));
        }

        let requested = LanguagePair::parse(source_language, target_language)?;

        let started = Instant::now();
        let mut result = ReverseLookupResult::empty(&folded, source_language, target_language);

        match self.collect_reverse(&folded, &requested.inverse()) {
            Ok(translations) => result.translations = translations,
            Err(LexisError::NoDictionaryAvailable(pair)) => {
                tracing::debug!("No reverse index for {pair}, lookup of '{folded}' is empty");
            }
            Err(e) => {
                tracing::warn!("Reverse lookup for '{folded}' failed: {e}");
            }
        }

        result.latency = started.elapsed();
        Ok(result)
    }

    /// The single reverse candidate at `lookup_order`, positioned exactly as
    /// it appears in `lookup_reverse_translations`.
    pub fn reverse_candidate_at(
        &self,
        word: &str,
        source_language: &str,
        target_language: &str,
        lookup_order: u32,
    ) -> Result<Option<ReverseCandidate>, LexisError> {
        let result = self.lookup_reverse_translations(word, source_language, target_language)?;

        Ok(result
            .translations
            .into_iter()
            .find(|c| c.lookup_order == lookup_order))
    }

    /// Dictionary lookup in the auto-resolved direction, falling back to an
    /// explicit reverse lookup when it finds nothing.
    pub fn lookup(
        &self,
        word: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<DictionaryLookup, LexisError> {
        let meanings = self.lookup_meanings(word, source_language, target_language)?;

        let reverse = if meanings.has_results() {
            None
        } else {
            Some(self.lookup_reverse_translations(word, source_language, target_language)?)
        };

        Ok(DictionaryLookup { meanings, reverse })
    }

    /// Typeahead: headwords containing `query`, exact match first, then
    /// shorter words, then lexical order.
    pub fn search_words(
        &self,
        query: &str,
        source_language: &str,
        target_language: &str,
        limit: usize,
    ) -> Result<Vec<String>, LexisError> {
        let folded = normalize_query(query);
        if folded.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        LanguagePair::parse(source_language, target_language)?;

        let words = match self.collect_search(&folded, source_language, target_language) {
            Ok(words) => words,
            Err(LexisError::NoDictionaryAvailable(_)) => Vec::new(),
            Err(e) => {
                tracing::warn!("Word search for '{folded}' failed: {e}");
                Vec::new()
            }
        };

        let mut ranked: Vec<(bool, usize, String, String)> = words
            .into_iter()
            .map(|word| {
                let key = normalize_query(&word);
                (key != folded, key.chars().count(), key, word)
            })
            .collect();
        ranked.sort();
        ranked.dedup_by(|a, b| a.3 == b.3);

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(_, _, _, word)| word)
            .collect())
    }

    fn pack_for(&self, resolution: &DirectionResolution) -> Result<Arc<PackStore>, LexisError> {
        let pair = LanguagePair::new(resolution.dict_source.clone(), resolution.dict_target.clone());
        self.source
            .pack(&pair)?
            .ok_or(LexisError::NoDictionaryAvailable(pair))
    }

    fn collect_meanings(
        &self,
        folded: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<(LookupDirection, Vec<MeaningCandidate>), LexisError> {
        let resolution = self.resolve_direction(source_language, target_language)?;
        let pack = self.pack_for(&resolution)?;
        let max = self.limits.max_meanings;

        let mut candidates = Vec::new();

        if resolution.use_reverse {
            for entry in pack.reverse_entries(folded).iter().take(max) {
                let group = pack.group(entry.source_word_group_id).ok_or_else(|| dangling(folded))?;
                let meaning = pack.meaning(entry.source_meaning_id).ok_or_else(|| dangling(folded))?;

                candidates.push(MeaningCandidate {
                    word_group_id: group.id,
                    meaning_id: meaning.id,
                    base_word: group.base_word.clone(),
                    translation: group.base_word.clone(),
                    context: meaning.context.clone(),
                    part_of_speech: meaning
                        .part_of_speech
                        .clone()
                        .or_else(|| group.part_of_speech.clone()),
                    is_primary: meaning.is_primary,
                    meaning_order: meaning.meaning_order,
                    lookup_order: Some(entry.lookup_order),
                    current_index: 0,
                    total_meanings: 0,
                });
            }
        } else {
            'groups: for group in pack.find_groups(folded) {
                for meaning in pack.meanings_of(group.id) {
                    if candidates.len() >= max {
                        break 'groups;
                    }

                    candidates.push(MeaningCandidate {
                        word_group_id: group.id,
                        meaning_id: meaning.id,
                        base_word: group.base_word.clone(),
                        translation: meaning.target_meaning.clone(),
                        context: meaning.context.clone(),
                        part_of_speech: meaning
                            .part_of_speech
                            .clone()
                            .or_else(|| group.part_of_speech.clone()),
                        is_primary: meaning.is_primary,
                        meaning_order: meaning.meaning_order,
                        lookup_order: None,
                        current_index: 0,
                        total_meanings: 0,
                    });
                }
            }
        }

        let total = candidates.len();
        for (i, candidate) in candidates.iter_mut().enumerate() {
            candidate.current_index = i + 1;
            candidate.total_meanings = total;
        }

        Ok((resolution.direction(), candidates))
    }

    fn collect_reverse(
        &self,
        folded: &str,
        pack_pair: &LanguagePair,
    ) -> Result<Vec<ReverseCandidate>, LexisError> {
        let pack = self
            .source
            .pack(pack_pair)?
            .ok_or_else(|| LexisError::NoDictionaryAvailable(pack_pair.clone()))?;

        let entries = pack.reverse_entries(folded);
        let total = entries.len().min(self.limits.max_reverse_results);

        entries
            .iter()
            .take(total)
            .enumerate()
            .map(|(i, entry)| {
                let group = pack.group(entry.source_word_group_id).ok_or_else(|| dangling(folded))?;
                let meaning = pack.meaning(entry.source_meaning_id).ok_or_else(|| dangling(folded))?;

                Ok(ReverseCandidate {
                    word_group_id: group.id,
                    meaning_id: meaning.id,
                    source_word: group.base_word.clone(),
                    meaning: meaning.target_meaning.clone(),
                    part_of_speech: meaning
                        .part_of_speech
                        .clone()
                        .or_else(|| group.part_of_speech.clone()),
                    context: meaning.context.clone(),
                    lookup_order: entry.lookup_order,
                    quality_score: entry.quality_score,
                    current_index: i + 1,
                    total,
                })
            })
            .collect()
    }

    fn collect_search(
        &self,
        folded: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, LexisError> {
        let resolution = self.resolve_direction(source_language, target_language)?;
        let pack = self.pack_for(&resolution)?;

        let words = if resolution.use_reverse {
            pack.reverse_targets()
                .filter(|target| target.contains(folded))
                .map(str::to_string)
                .collect()
        } else {
            pack.word_groups()
                .filter(|g| normalize_query(&g.base_word).contains(folded))
                .map(|g| g.base_word.clone())
                .collect()
        };

        Ok(words)
    }
}

fn dangling(folded: &str) -> LexisError {
    LexisError::Storage(format!("reverse index for '{folded}' references a missing row"))
}

fn poisoned() -> LexisError {
    LexisError::Storage("language pair cache lock poisoned".to_string())
}
