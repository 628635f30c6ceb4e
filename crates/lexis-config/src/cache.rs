use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_age_days() -> u32 {
    30
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Entry ceiling; least-recently-accessed entries go first
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    /// JSON snapshot location. In-memory only when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
            max_age_days: default_max_age_days(),
            path: None,
        }
    }
}
