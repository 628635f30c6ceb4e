use std::collections::{HashMap, HashSet};

use lexis_core::preprocess::normalize_query;
use lexis_core::{LanguagePair, Meaning, MeaningId, ReverseLookupEntry, WordGroup, WordGroupId};

use crate::error::PackError;
use crate::pack::{PackBundle, PackMetadata};

/// Immutable, indexed view of one installed pack.
///
/// Built once from a validated bundle and never mutated; a pack update
/// replaces the whole store.
#[derive(Debug)]
pub struct PackStore {
    metadata: PackMetadata,
    pair: LanguagePair,
    groups: Vec<WordGroup>,
    group_index: HashMap<WordGroupId, usize>,
    /// Folded surface form -> group positions
    form_index: HashMap<String, Vec<usize>>,
    /// Meanings per group, sorted by `meaning_order`
    meanings: HashMap<WordGroupId, Vec<Meaning>>,
    meaning_index: HashMap<MeaningId, (WordGroupId, usize)>,
    /// Folded target word -> entries sorted by `lookup_order`
    reverse_index: HashMap<String, Vec<ReverseLookupEntry>>,
}

impl PackStore {
    /// Validate every table of the bundle and index it. Either the whole
    /// pack becomes queryable or an error is returned.
    pub fn from_bundle(bundle: PackBundle) -> Result<Self, PackError> {
        let pair = bundle.language_pair();
        let PackBundle {
            metadata,
            word_groups,
            meanings,
            reverse_entries,
        } = bundle;

        let mut group_index = HashMap::with_capacity(word_groups.len());
        let mut form_index: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, group) in word_groups.iter().enumerate() {
            let found = group.language_pair();
            if found != pair {
                return Err(PackError::LanguageMismatch {
                    declared: pair.pack_id(),
                    found: found.pack_id(),
                });
            }

            if normalize_query(&group.base_word).is_empty() {
                return Err(invalid(format!("word group {} has an empty base word", group.id)));
            }

            if !group.has_base_in_forms() {
                return Err(invalid(format!(
                    "word group {} does not list its base word '{}' among its forms",
                    group.id, group.base_word
                )));
            }

            if group_index.insert(group.id, idx).is_some() {
                return Err(invalid(format!("duplicate word group id {}", group.id)));
            }

            let mut keys: Vec<String> = group.word_forms.iter().map(|f| normalize_query(f)).collect();
            keys.sort_unstable();
            keys.dedup();

            for key in keys {
                form_index.entry(key).or_default().push(idx);
            }
        }

        let mut by_group: HashMap<WordGroupId, Vec<Meaning>> = HashMap::new();
        let mut meaning_ids = HashSet::with_capacity(meanings.len());

        for meaning in meanings {
            if !group_index.contains_key(&meaning.word_group_id) {
                return Err(invalid(format!(
                    "meaning {} references missing word group {}",
                    meaning.id, meaning.word_group_id
                )));
            }

            if !meaning_ids.insert(meaning.id) {
                return Err(invalid(format!("duplicate meaning id {}", meaning.id)));
            }

            by_group.entry(meaning.word_group_id).or_default().push(meaning);
        }

        let mut meaning_index = HashMap::with_capacity(meaning_ids.len());

        for (group_id, list) in by_group.iter_mut() {
            list.sort_by_key(|m| m.meaning_order);

            for (pos, meaning) in list.iter().enumerate() {
                if meaning.meaning_order as usize != pos + 1 {
                    return Err(invalid(format!(
                        "meanings of word group {group_id} are not ordered 1..N"
                    )));
                }
                meaning_index.insert(meaning.id, (*group_id, pos));
            }

            if list.iter().filter(|m| m.is_primary).count() > 1 {
                return Err(invalid(format!(
                    "word group {group_id} has more than one primary meaning"
                )));
            }
        }

        let mut reverse_index: HashMap<String, Vec<ReverseLookupEntry>> = HashMap::new();

        for entry in reverse_entries {
            match meaning_index.get(&entry.source_meaning_id) {
                Some((owner, _)) if *owner == entry.source_word_group_id => {}
                _ => {
                    return Err(invalid(format!(
                        "reverse entry '{}' references missing meaning {} of word group {}",
                        entry.target_word, entry.source_meaning_id, entry.source_word_group_id
                    )));
                }
            }

            let key = normalize_query(&entry.target_word);
            if key.is_empty() {
                return Err(invalid("reverse entry with empty target word".to_string()));
            }

            reverse_index.entry(key).or_default().push(entry);
        }

        for (target, list) in reverse_index.iter_mut() {
            list.sort_by_key(|e| e.lookup_order);

            for w in list.windows(2) {
                if w[0].lookup_order == w[1].lookup_order {
                    return Err(invalid(format!(
                        "reverse entries for '{target}' share lookup order {}",
                        w[0].lookup_order
                    )));
                }
                if w[1].quality_score > w[0].quality_score {
                    return Err(invalid(format!(
                        "reverse entries for '{target}' are not ranked by quality"
                    )));
                }
            }
        }

        Ok(Self {
            metadata,
            pair,
            groups: word_groups,
            group_index,
            form_index,
            meanings: by_group,
            meaning_index,
            reverse_index,
        })
    }

    pub fn metadata(&self) -> &PackMetadata {
        &self.metadata
    }

    pub fn language_pair(&self) -> &LanguagePair {
        &self.pair
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn meaning_count(&self) -> usize {
        self.meaning_index.len()
    }

    pub fn reverse_count(&self) -> usize {
        self.reverse_index.values().map(Vec::len).sum()
    }

    pub fn group(&self, id: WordGroupId) -> Option<&WordGroup> {
        self.group_index.get(&id).and_then(|&idx| self.groups.get(idx))
    }

    pub fn meaning(&self, id: MeaningId) -> Option<&Meaning> {
        let (group_id, pos) = self.meaning_index.get(&id)?;
        self.meanings.get(group_id)?.get(*pos)
    }

    /// Meanings of a group in cycling order
    pub fn meanings_of(&self, group_id: WordGroupId) -> &[Meaning] {
        self.meanings
            .get(&group_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Groups whose base word or any form matches `folded`. Groups whose
    /// base word itself matches come first, then ascending id.
    pub fn find_groups(&self, folded: &str) -> Vec<&WordGroup> {
        let Some(indices) = self.form_index.get(folded) else {
            return Vec::new();
        };

        let mut groups: Vec<&WordGroup> = indices
            .iter()
            .filter_map(|&idx| self.groups.get(idx))
            .collect();

        groups.sort_by_key(|g| (normalize_query(&g.base_word) != folded, g.id));
        groups
    }

    /// Reverse entries for a folded target word, in `lookup_order`
    pub fn reverse_entries(&self, folded: &str) -> &[ReverseLookupEntry] {
        self.reverse_index
            .get(folded)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn word_groups(&self) -> impl Iterator<Item = &WordGroup> {
        self.groups.iter()
    }

    /// Folded target words present in the reverse index
    pub fn reverse_targets(&self) -> impl Iterator<Item = &str> {
        self.reverse_index.keys().map(String::as_str)
    }
}

fn invalid(message: String) -> PackError {
    PackError::InvalidPack(message)
}
