use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::pack::PackBundle;
use crate::store::PackStore;

/// Entry floor for packs without a tuned threshold
pub const DEFAULT_MINIMUM_ENTRIES: usize = 5_000;

/// Minimum meaning count a converted pack must reach before it is
/// considered complete. Keyed by pack id ("de-en").
pub fn minimum_entries(pack_id: &str) -> usize {
    match pack_id {
        "de-en" => 15_000,
        "es-en" => 12_000,
        "fr-en" => 30_000,
        "it-en" => 25_000,
        "pt-en" => 10_000,
        "ru-en" => 22_500,
        "ja-en" => 15_000,
        "ko-en" => 7_500,
        "zh-en" => 20_000,
        "ar-en" => 10_000,
        "hi-en" => 7_500,
        _ => DEFAULT_MINIMUM_ENTRIES,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub pack_id: String,
    pub total_groups: usize,
    pub total_meanings: usize,
    pub reverse_entries: usize,
    pub empty_lemmas: usize,
    pub empty_meanings: usize,
    pub orphan_meanings: usize,
    pub dangling_reverse: usize,
    pub language_mismatches: usize,
    pub minimum_entries: usize,
    pub meets_threshold: bool,
    /// First import-validation failure not covered by the counters above
    /// (ordering, primary flags, reverse ranking)
    pub import_error: Option<String>,
    pub passed: bool,
}

/// Check a bundle for integrity and completeness without installing it.
pub fn verify_pack(bundle: &PackBundle, minimum: Option<usize>) -> VerificationReport {
    let pack_id = bundle.metadata.pack_id.clone();
    let minimum = minimum.unwrap_or_else(|| minimum_entries(&pack_id));
    let pair = bundle.language_pair();

    let group_ids: HashSet<u64> = bundle.word_groups.iter().map(|g| g.id).collect();
    let meaning_groups: HashMap<u64, u64> = bundle
        .meanings
        .iter()
        .map(|m| (m.id, m.word_group_id))
        .collect();

    let empty_lemmas = bundle
        .word_groups
        .iter()
        .filter(|g| g.base_word.trim().is_empty())
        .count();
    let language_mismatches = bundle
        .word_groups
        .iter()
        .filter(|g| g.language_pair() != pair)
        .count();
    let empty_meanings = bundle
        .meanings
        .iter()
        .filter(|m| m.target_meaning.trim().is_empty())
        .count();
    let orphan_meanings = bundle
        .meanings
        .iter()
        .filter(|m| !group_ids.contains(&m.word_group_id))
        .count();
    let dangling_reverse = bundle
        .reverse_entries
        .iter()
        .filter(|e| meaning_groups.get(&e.source_meaning_id) != Some(&e.source_word_group_id))
        .count();

    let import_error = PackStore::from_bundle(bundle.clone())
        .err()
        .map(|e| e.to_string());

    let meets_threshold = bundle.meanings.len() >= minimum;
    let clean = empty_lemmas + empty_meanings + orphan_meanings + dangling_reverse + language_mismatches
        == 0;

    let report = VerificationReport {
        pack_id,
        total_groups: bundle.word_groups.len(),
        total_meanings: bundle.meanings.len(),
        reverse_entries: bundle.reverse_entries.len(),
        empty_lemmas,
        empty_meanings,
        orphan_meanings,
        dangling_reverse,
        language_mismatches,
        minimum_entries: minimum,
        meets_threshold,
        passed: meets_threshold && clean && import_error.is_none(),
        import_error,
    };

    if report.passed {
        tracing::info!("Pack {} verified", report.pack_id);
    } else {
        tracing::warn!(
            "Pack {} failed verification ({} meanings, minimum {})",
            report.pack_id,
            report.total_meanings,
            report.minimum_entries
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn thresholds_per_pack() {
        assert_eq!(minimum_entries("fr-en"), 30_000);
        assert_eq!(minimum_entries("ko-en"), 7_500);
        assert_eq!(minimum_entries("sv-en"), DEFAULT_MINIMUM_ENTRIES);
    }

    #[test]
    fn small_fixture_misses_default_threshold() {
        let report = verify_pack(&fixtures::de_en(), None);

        assert_eq!(report.minimum_entries, 15_000);
        assert_eq!(report.total_groups, 5);
        assert_eq!(report.total_meanings, 7);
        assert_eq!(report.reverse_entries, 6);
        assert!(report.import_error.is_none());
        assert!(!report.meets_threshold);
        assert!(!report.passed);
    }

    #[test]
    fn explicit_minimum_overrides_threshold() {
        let report = verify_pack(&fixtures::de_en(), Some(5));
        assert!(report.passed);
    }

    #[test]
    fn counts_integrity_problems() {
        let mut bundle = fixtures::de_en();
        bundle.meanings[0].target_meaning = " ".into();
        bundle.meanings[1].word_group_id = 99;
        bundle.reverse_entries[0].source_meaning_id = 5;

        let report = verify_pack(&bundle, Some(1));
        assert_eq!(report.empty_meanings, 1);
        assert_eq!(report.orphan_meanings, 1);
        // entries pointing at the orphan, plus the one rewired to another group
        assert_eq!(report.dangling_reverse, 2);
        assert!(report.import_error.is_some());
        assert!(!report.passed);
    }

    #[test]
    fn counts_language_mismatches() {
        let mut bundle = fixtures::de_en();
        bundle.word_groups[2].source_language = "nl".parse().unwrap();

        let report = verify_pack(&bundle, Some(1));
        assert_eq!(report.language_mismatches, 1);
        assert!(!report.passed);
    }
}
