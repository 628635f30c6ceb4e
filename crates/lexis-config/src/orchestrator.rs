use serde::{Deserialize, Serialize};

fn default_single_word_max_chars() -> usize {
    50
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Queries at or above this length skip the dictionary tier
    #[serde(default = "default_single_word_max_chars")]
    pub single_word_max_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            single_word_max_chars: default_single_word_max_chars(),
        }
    }
}
