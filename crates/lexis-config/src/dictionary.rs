use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_pack_dir() -> String {
    "packs".to_string()
}

fn default_max_meanings() -> usize {
    10
}

fn default_max_reverse_results() -> usize {
    8
}

fn default_search_limit() -> usize {
    20
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DictionaryConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Directory scanned for `*.json` pack bundles at startup
    #[serde(default = "default_pack_dir")]
    pub pack_dir: String,
    #[serde(default)]
    pub additional_packs: Vec<String>,
    #[serde(default = "default_max_meanings")]
    pub max_meanings: usize,
    #[serde(default = "default_max_reverse_results")]
    pub max_reverse_results: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            pack_dir: default_pack_dir(),
            additional_packs: vec![],
            max_meanings: default_max_meanings(),
            max_reverse_results: default_max_reverse_results(),
            search_limit: default_search_limit(),
        }
    }
}
