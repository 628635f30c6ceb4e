use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use lexis_core::preprocess::normalize_query;
use lexis_core::{LanguagePair, Meaning, ReverseLookupEntry, WordGroup};
use regex::Regex;
use serde::Serialize;

use crate::pack::{PackBundle, PackMetadata, PackType};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static pattern"));
static BRACKET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("static pattern"));
static NUMBERING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s*").expect("static pattern"));
static CONTEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([^)]+)\)\s*(.+)$").expect("static pattern"));

/// Separators tried in order; the first one present splits the senses
const SENSE_SEPARATORS: [&str; 4] = [" | ", "|", ";", ","];

/// One dictionary row as produced by a converter: headword plus a raw,
/// possibly tag-laden definition string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub lemma: String,
    pub definition: String,
    pub part_of_speech: Option<String>,
    pub forms: Vec<String>,
}

impl RawEntry {
    pub fn new(lemma: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            definition: definition.into(),
            part_of_speech: None,
            forms: Vec::new(),
        }
    }

    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.part_of_speech = Some(pos.into());
        self
    }

    /// `lemma<TAB>definition[<TAB>pos[<TAB>form,form,...]]`
    pub fn parse_tsv_line(line: &str) -> Option<Self> {
        let mut cols = line.split('\t');
        let lemma = cols.next()?.trim();
        let definition = cols.next()?.trim();

        let part_of_speech = cols
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let forms = cols
            .next()
            .map(|f| {
                f.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            lemma: lemma.to_string(),
            definition: definition.to_string(),
            part_of_speech,
            forms,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sense {
    pub text: String,
    pub context: Option<String>,
}

/// Strip markup, pronunciation brackets and sense numbering; one line per
/// sense block joined with "; ".
pub fn clean_definition(raw: &str) -> String {
    let without_tags = TAG_RE.replace_all(raw, " ");
    let without_brackets = BRACKET_RE.replace_all(&without_tags, " ");

    without_brackets
        .lines()
        .map(|line| NUMBERING_RE.replace(line, "").into_owned())
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Split a cleaned definition into discrete senses. A leading
/// parenthesized tag ("(archaic) thee") becomes the sense context.
pub fn split_senses(cleaned: &str) -> Vec<Sense> {
    let parts: Vec<&str> = match SENSE_SEPARATORS.iter().find(|sep| cleaned.contains(*sep)) {
        Some(sep) => cleaned.split(sep).collect(),
        None => vec![cleaned],
    };

    let mut senses: Vec<Sense> = Vec::new();

    for part in parts {
        let part = NUMBERING_RE.replace(part.trim(), "");
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let sense = match CONTEXT_RE.captures(part) {
            Some(caps) => Sense {
                text: caps[2].trim().to_string(),
                context: Some(caps[1].trim().to_lowercase()),
            },
            None => Sense {
                text: part.to_string(),
                context: None,
            },
        };

        if sense.text.is_empty() {
            continue;
        }

        let key = normalize_query(&sense.text);
        if !senses.iter().any(|s| normalize_query(&s.text) == key) {
            senses.push(sense);
        }
    }

    senses
}

/// What a scorer sees for one candidate reverse entry
pub struct ScoreInput<'a> {
    pub group: &'a WordGroup,
    pub meaning: &'a Meaning,
    /// Folded target word the entry is keyed by
    pub target_word: &'a str,
}

/// Build-time ranking policy for reverse entries. Higher is better.
pub trait QualityScorer: Send + Sync {
    fn score(&self, input: &ScoreInput<'_>) -> i32;
}

const PENALIZED_CONTEXTS: [&str; 8] = [
    "archaic", "obsolete", "dated", "slang", "regional", "rare", "dialect", "vulgar",
];

const INFLECTION_MARKERS: [&str; 8] = [
    "plural of",
    "past tense of",
    "past participle of",
    "present participle of",
    "inflection of",
    "genitive of",
    "comparative of",
    "superlative of",
];

/// Rewards primary, early, short senses; penalizes marked registers,
/// proper nouns and inflection glosses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQualityScorer;

impl QualityScorer for DefaultQualityScorer {
    fn score(&self, input: &ScoreInput<'_>) -> i32 {
        let mut score = 100;

        if input.meaning.is_primary {
            score += 20;
        }

        score -= (input.meaning.meaning_order.saturating_sub(1) as i32 * 5).min(25);

        if let Some(context) = &input.meaning.context {
            let context = context.to_lowercase();
            score -= 40 * PENALIZED_CONTEXTS
                .iter()
                .filter(|tag| context.contains(*tag))
                .count() as i32;
        }

        let gloss = input.meaning.target_meaning.to_lowercase();
        if INFLECTION_MARKERS.iter().any(|m| gloss.starts_with(m)) {
            score -= 60;
        }

        let pos = input
            .meaning
            .part_of_speech
            .as_deref()
            .or(input.group.part_of_speech.as_deref())
            .map(str::to_lowercase);
        match pos {
            Some(pos) if pos.contains("proper") => score -= 50,
            None if input.group.base_word.chars().next().is_some_and(char::is_uppercase) => {
                score -= 15
            }
            _ => {}
        }

        let target_len = input.target_word.chars().count() as i32;
        if !input.target_word.contains(' ') {
            score += 10;
        }
        if target_len <= 6 {
            score += 5;
        }
        score -= (target_len - 12).clamp(0, 20);

        score
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub word_groups: usize,
    pub forward_entries: usize,
    pub reverse_entries: usize,
    pub skipped_rows: usize,
}

struct GroupDraft {
    base_word: String,
    forms: Vec<String>,
    part_of_speech: Option<String>,
    senses: Vec<Sense>,
}

/// Turns converter rows into a normalized, pre-ranked pack bundle
pub struct PackBuilder {
    pair: LanguagePair,
    pack_type: PackType,
    scorer: Box<dyn QualityScorer>,
    converted_from: Option<String>,
}

impl PackBuilder {
    pub fn new(pair: LanguagePair) -> Self {
        Self {
            pair,
            pack_type: PackType::Bidirectional,
            scorer: Box::new(DefaultQualityScorer),
            converted_from: None,
        }
    }

    pub fn with_scorer(mut self, scorer: impl QualityScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    /// Skip the reverse index
    pub fn forward_only(mut self) -> Self {
        self.pack_type = PackType::Forward;
        self
    }

    pub fn converted_from(mut self, format: impl Into<String>) -> Self {
        self.converted_from = Some(format.into());
        self
    }

    pub fn build(&self, rows: impl IntoIterator<Item = RawEntry>) -> (PackBundle, BuildStats) {
        let mut stats = BuildStats::default();
        let mut drafts: Vec<GroupDraft> = Vec::new();
        let mut draft_index: HashMap<(String, Option<String>), usize> = HashMap::new();

        for row in rows {
            let lemma = row.lemma.trim();
            let senses = split_senses(&clean_definition(&row.definition));

            if lemma.is_empty() || senses.is_empty() {
                stats.skipped_rows += 1;
                continue;
            }

            let pos = row
                .part_of_speech
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_lowercase);
            let key = (normalize_query(lemma), pos.clone());

            let idx = *draft_index.entry(key).or_insert_with(|| {
                drafts.push(GroupDraft {
                    base_word: lemma.to_string(),
                    forms: Vec::new(),
                    part_of_speech: pos,
                    senses: Vec::new(),
                });
                drafts.len() - 1
            });
            let draft = &mut drafts[idx];

            for form in std::iter::once(lemma.to_string()).chain(row.forms) {
                if form != draft.base_word && !draft.forms.contains(&form) {
                    draft.forms.push(form);
                }
            }

            for sense in senses {
                let key = normalize_query(&sense.text);
                if !draft.senses.iter().any(|s| normalize_query(&s.text) == key) {
                    draft.senses.push(sense);
                }
            }
        }

        let mut word_groups = Vec::with_capacity(drafts.len());
        let mut meanings = Vec::new();

        for (i, draft) in drafts.into_iter().enumerate() {
            let group_id = i as u64 + 1;

            for (order, sense) in draft.senses.into_iter().enumerate() {
                meanings.push(Meaning {
                    id: meanings.len() as u64 + 1,
                    word_group_id: group_id,
                    meaning_order: order as u32 + 1,
                    target_meaning: sense.text,
                    context: sense.context,
                    part_of_speech: draft.part_of_speech.clone(),
                    is_primary: order == 0,
                });
            }

            word_groups.push(WordGroup::new(
                group_id,
                draft.base_word,
                draft.forms,
                draft.part_of_speech,
                &self.pair,
            ));
        }

        let reverse_entries = match self.pack_type {
            PackType::Bidirectional => self.rank_reverse(&word_groups, &meanings),
            PackType::Forward => Vec::new(),
        };

        stats.word_groups = word_groups.len();
        stats.forward_entries = meanings.len();
        stats.reverse_entries = reverse_entries.len();

        let mut metadata = PackMetadata::new(&self.pair, self.pack_type);
        metadata.converted_from = self.converted_from.clone();

        tracing::info!(
            "Built pack {}: {} groups, {} forward + {} reverse entries ({} rows skipped)",
            metadata.pack_id,
            stats.word_groups,
            stats.forward_entries,
            stats.reverse_entries,
            stats.skipped_rows
        );

        let bundle = PackBundle {
            metadata,
            word_groups,
            meanings,
            reverse_entries,
        };

        (bundle, stats)
    }

    /// Score every (target word, meaning) pair, then order each target's
    /// entries by quality desc, base word asc, group id asc.
    fn rank_reverse(&self, groups: &[WordGroup], meanings: &[Meaning]) -> Vec<ReverseLookupEntry> {
        let by_id: HashMap<u64, &WordGroup> = groups.iter().map(|g| (g.id, g)).collect();
        let mut by_target: BTreeMap<String, Vec<(i32, &WordGroup, &Meaning)>> = BTreeMap::new();

        for meaning in meanings {
            let Some(group) = by_id.get(&meaning.word_group_id) else {
                continue;
            };

            let target = normalize_query(&meaning.target_meaning);
            if target.is_empty() || target == normalize_query(&group.base_word) {
                continue;
            }

            let score = self.scorer.score(&ScoreInput {
                group,
                meaning,
                target_word: &target,
            });

            let candidates = by_target.entry(target).or_default();
            // one entry per group and target; keep the best-scoring sense
            match candidates.iter_mut().find(|(_, g, _)| g.id == group.id) {
                Some(existing) if existing.0 >= score => {}
                Some(existing) => *existing = (score, group, meaning),
                None => candidates.push((score, group, meaning)),
            }
        }

        let mut entries = Vec::new();

        for (target, mut candidates) in by_target {
            candidates.sort_by(|a, b| {
                b.0.cmp(&a.0)
                    .then_with(|| a.1.base_word.cmp(&b.1.base_word))
                    .then_with(|| a.1.id.cmp(&b.1.id))
            });

            for (order, (score, group, meaning)) in candidates.into_iter().enumerate() {
                entries.push(ReverseLookupEntry {
                    target_word: target.clone(),
                    source_word_group_id: group.id,
                    source_meaning_id: meaning.id,
                    lookup_order: order as u32 + 1,
                    quality_score: score,
                });
            }
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PackStore;

    fn de_en() -> LanguagePair {
        LanguagePair::parse("de", "en").unwrap()
    }

    #[test]
    fn cleans_markup_and_numbering() {
        assert_eq!(
            clean_definition("<b>1. house</b> [haʊs]\n2.  building "),
            "house; building"
        );
    }

    #[test]
    fn splits_on_first_present_separator() {
        let senses = split_senses("water | body of water | rain");
        let texts: Vec<&str> = senses.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["water", "body of water", "rain"]);

        // "|" takes precedence over ","
        let senses = split_senses("a, b|c");
        let texts: Vec<&str> = senses.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a, b", "c"]);
    }

    #[test]
    fn extracts_context_tags_and_dedups() {
        let senses = split_senses("you; (archaic) thee; You");
        assert_eq!(senses.len(), 2);
        assert_eq!(senses[1].text, "thee");
        assert_eq!(senses[1].context.as_deref(), Some("archaic"));
    }

    #[test]
    fn builds_dense_meanings_with_one_primary() {
        let (bundle, stats) = PackBuilder::new(LanguagePair::parse("es", "en").unwrap()).build(vec![
            RawEntry::new("agua", "water | body of water | rain").with_pos("noun"),
        ]);

        assert_eq!(stats.word_groups, 1);
        assert_eq!(stats.forward_entries, 3);

        let orders: Vec<u32> = bundle.meanings.iter().map(|m| m.meaning_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(bundle.meanings.iter().filter(|m| m.is_primary).count(), 1);
        assert!(bundle.meanings[0].is_primary);
    }

    #[test]
    fn merges_rows_for_the_same_lemma_and_pos() {
        let (bundle, _) = PackBuilder::new(de_en()).build(vec![
            RawEntry::new("Haus", "house").with_pos("noun"),
            RawEntry::new("haus", "house; building").with_pos("Noun"),
            RawEntry::new("Haus", "to dwell").with_pos("verb"),
        ]);

        assert_eq!(bundle.word_groups.len(), 2);
        assert_eq!(bundle.word_groups[0].word_forms, vec!["Haus", "haus"]);

        let noun_meanings: Vec<&str> = bundle
            .meanings
            .iter()
            .filter(|m| m.word_group_id == 1)
            .map(|m| m.target_meaning.as_str())
            .collect();
        assert_eq!(noun_meanings, vec!["house", "building"]);
    }

    #[test]
    fn skips_empty_rows() {
        let (bundle, stats) = PackBuilder::new(de_en()).build(vec![
            RawEntry::new("", "house"),
            RawEntry::new("Haus", "<br/>"),
            RawEntry::new("Tür", "door"),
        ]);

        assert_eq!(stats.skipped_rows, 2);
        assert_eq!(bundle.word_groups.len(), 1);
    }

    #[test]
    fn ranks_marked_senses_below_plain_ones() {
        let (bundle, _) = PackBuilder::new(de_en()).build(vec![
            RawEntry::new("Zuhause", "home").with_pos("noun"),
            RawEntry::new("Heim", "(archaic) home").with_pos("noun"),
        ]);

        let home: Vec<&ReverseLookupEntry> = bundle
            .reverse_entries
            .iter()
            .filter(|e| e.target_word == "home")
            .collect();
        assert_eq!(home.len(), 2);
        assert_eq!(home[0].lookup_order, 1);

        let first = bundle
            .word_groups
            .iter()
            .find(|g| g.id == home[0].source_word_group_id)
            .unwrap();
        assert_eq!(first.base_word, "Zuhause");
        assert!(home[0].quality_score > home[1].quality_score);
    }

    #[test]
    fn ties_break_by_base_word() {
        let (bundle, _) = PackBuilder::new(de_en()).build(vec![
            RawEntry::new("Zuhause", "home").with_pos("noun"),
            RawEntry::new("Heim", "home").with_pos("noun"),
        ]);

        let order: Vec<u64> = bundle
            .reverse_entries
            .iter()
            .map(|e| e.source_word_group_id)
            .collect();
        // Heim (group 2) sorts before Zuhause (group 1)
        assert_eq!(order, vec![2, 1]);
        assert_eq!(
            bundle.reverse_entries[0].quality_score,
            bundle.reverse_entries[1].quality_score
        );
    }

    #[test]
    fn skips_circular_reverse_entries() {
        let (bundle, _) = PackBuilder::new(LanguagePair::parse("fr", "en").unwrap())
            .build(vec![RawEntry::new("restaurant", "restaurant; eatery")]);

        let targets: Vec<&str> = bundle
            .reverse_entries
            .iter()
            .map(|e| e.target_word.as_str())
            .collect();
        assert_eq!(targets, vec!["eatery"]);
    }

    #[test]
    fn scorer_is_pluggable() {
        struct Shortest;
        impl QualityScorer for Shortest {
            fn score(&self, input: &ScoreInput<'_>) -> i32 {
                -(input.group.base_word.len() as i32)
            }
        }

        let (bundle, _) = PackBuilder::new(de_en()).with_scorer(Shortest).build(vec![
            RawEntry::new("Wohnung", "home"),
            RawEntry::new("Heim", "home"),
        ]);

        assert_eq!(bundle.reverse_entries[0].source_word_group_id, 2);
        assert_eq!(bundle.reverse_entries[0].quality_score, -4);
    }

    #[test]
    fn forward_only_has_no_reverse_index() {
        let (bundle, stats) = PackBuilder::new(de_en())
            .forward_only()
            .build(vec![RawEntry::new("Haus", "house")]);

        assert!(bundle.reverse_entries.is_empty());
        assert_eq!(stats.reverse_entries, 0);
        assert_eq!(bundle.metadata.pack_type, PackType::Forward);
    }

    #[test]
    fn built_packs_pass_import_validation() {
        let (bundle, _) = PackBuilder::new(de_en()).converted_from("stardict").build(vec![
            RawEntry::new("Haus", "house; building; (archaic) household").with_pos("noun"),
            RawEntry::new("Heim", "home; (regional) shelter").with_pos("noun"),
            RawEntry::new("Zuhause", "home").with_pos("noun"),
            RawEntry::new("Berlin", "Berlin; capital of Germany").with_pos("proper noun"),
            RawEntry::new("Häuser", "plural of Haus").with_pos("noun"),
        ]);

        assert_eq!(bundle.metadata.converted_from.as_deref(), Some("stardict"));
        let store = PackStore::from_bundle(bundle).unwrap();
        assert_eq!(store.reverse_entries("home").len(), 2);
    }

    #[test]
    fn parses_tsv_rows() {
        let row = RawEntry::parse_tsv_line("Haus\thouse; building\tnoun\tHäuser, Hauses").unwrap();
        assert_eq!(row.lemma, "Haus");
        assert_eq!(row.part_of_speech.as_deref(), Some("noun"));
        assert_eq!(row.forms, vec!["Häuser", "Hauses"]);

        let bare = RawEntry::parse_tsv_line("Tür\tdoor").unwrap();
        assert!(bare.part_of_speech.is_none());
        assert!(RawEntry::parse_tsv_line("lonely").is_none());
    }
}
