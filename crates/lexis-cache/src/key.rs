use std::fmt;

use lexis_core::preprocess::normalize_query;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex sha256 over (normalized text, source, target)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(text: &str, source_language: &str, target_language: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_query(text).as_bytes());
        hasher.update([0x1f]);
        hasher.update(source_language.trim().to_lowercase().as_bytes());
        hasher.update([0x1f]);
        hasher.update(target_language.trim().to_lowercase().as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
