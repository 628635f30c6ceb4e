//! Hand-written packs shared by unit tests

use lexis_core::{LanguagePair, Meaning, ReverseLookupEntry, WordGroup};

use crate::pack::{PackBundle, PackMetadata, PackType};

fn meaning(id: u64, group: u64, order: u32, text: &str, context: Option<&str>) -> Meaning {
    Meaning {
        id,
        word_group_id: group,
        meaning_order: order,
        target_meaning: text.to_string(),
        context: context.map(str::to_string),
        part_of_speech: Some("noun".to_string()),
        is_primary: order == 1,
    }
}

fn reverse(target: &str, group: u64, meaning: u64, order: u32, quality: i32) -> ReverseLookupEntry {
    ReverseLookupEntry {
        target_word: target.to_string(),
        source_word_group_id: group,
        source_meaning_id: meaning,
        lookup_order: order,
        quality_score: quality,
    }
}

fn forms(list: &[&str]) -> Vec<String> {
    list.iter().map(|f| f.to_string()).collect()
}

/// es-en: "agua" with three meanings, "casa" with two
pub fn es_en() -> PackBundle {
    let pair = LanguagePair::parse("es", "en").unwrap();
    let noun = || Some("noun".to_string());

    PackBundle {
        metadata: PackMetadata::new(&pair, PackType::Bidirectional),
        word_groups: vec![
            WordGroup::new(1, "agua", forms(&["aguas"]), noun(), &pair),
            WordGroup::new(2, "casa", forms(&["casas"]), noun(), &pair),
        ],
        meanings: vec![
            meaning(1, 1, 1, "water", None),
            meaning(2, 1, 2, "body of water", None),
            meaning(3, 1, 3, "rain", None),
            meaning(4, 2, 1, "house", None),
            meaning(5, 2, 2, "home", None),
        ],
        reverse_entries: vec![
            reverse("water", 1, 1, 1, 100),
            reverse("house", 2, 4, 1, 100),
        ],
    }
}

/// de-en: homographs ("Bank"), an archaic sense and a two-way reverse
/// ranking for "home"
pub fn de_en() -> PackBundle {
    let pair = LanguagePair::parse("de", "en").unwrap();
    let noun = || Some("noun".to_string());

    PackBundle {
        metadata: PackMetadata::new(&pair, PackType::Bidirectional),
        word_groups: vec![
            WordGroup::new(1, "Haus", forms(&["Häuser", "Hauses"]), noun(), &pair),
            WordGroup::new(2, "Heim", forms(&["Heime"]), noun(), &pair),
            WordGroup::new(3, "Zuhause", Vec::new(), noun(), &pair),
            WordGroup::new(4, "Bank", forms(&["Bänke"]), noun(), &pair),
            WordGroup::new(5, "Bank", forms(&["Banken"]), noun(), &pair),
        ],
        meanings: vec![
            meaning(1, 1, 1, "house", None),
            meaning(2, 1, 2, "building", None),
            meaning(3, 2, 1, "home", None),
            meaning(4, 3, 1, "home", None),
            meaning(5, 4, 1, "bench", None),
            meaning(6, 5, 1, "bank", None),
            meaning(7, 5, 2, "counting table", Some("archaic")),
        ],
        reverse_entries: vec![
            reverse("house", 1, 1, 1, 100),
            reverse("building", 1, 2, 1, 60),
            reverse("home", 2, 3, 1, 90),
            reverse("home", 3, 4, 2, 85),
            reverse("bench", 4, 5, 1, 100),
            reverse("bank", 5, 6, 1, 100),
        ],
    }
}
