//! Result cache for resolved translations.
//!
//! Entries are keyed by a hash of the normalized query and both language
//! codes. Eviction runs lazily after each write: entries past the maximum
//! age go first, then the least recently accessed until the entry count is
//! back under the ceiling. Reads never evict.

pub mod key;
pub mod memory;

use lexis_core::{LexisError, TranslationResponse};
use serde::Serialize;

pub use key::CacheKey;
pub use memory::{CacheEntry, CachePolicy, MemoryCache};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CacheError> for LexisError {
    fn from(err: CacheError) -> Self {
        LexisError::CacheIo(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[async_trait::async_trait]
pub trait ResultCache: Send + Sync {
    /// Stored response tagged as cache-sourced, refreshing its access stats
    async fn get(&self, key: &CacheKey) -> Option<TranslationResponse>;

    /// Insert or replace. Failed and cache-sourced responses are ignored.
    async fn put(&self, key: CacheKey, response: TranslationResponse) -> Result<(), CacheError>;

    /// Drop entries created more than `max_age` ago; returns how many went
    async fn purge_older_than(&self, max_age: chrono::Duration) -> usize;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn stats(&self) -> CacheStats;
}
