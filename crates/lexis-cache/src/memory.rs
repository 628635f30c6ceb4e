use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use lexis_config::cache::CacheConfig;
use lexis_core::TranslationResponse;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;

use crate::{CacheError, CacheKey, CacheStats, ResultCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_entries: usize,
    pub max_age: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_age: Duration::days(30),
        }
    }
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            max_entries: config.max_entries,
            max_age: Duration::days(i64::from(config.max_age_days)),
        }
    }
}

/// Serialized form of one cached resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub response: TranslationResponse,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
}

/// Access stats are atomics so hits only need the read lock.
/// `access_seq` orders recency; the timestamp is only reported.
struct Slot {
    response: TranslationResponse,
    created_at: DateTime<Utc>,
    last_accessed_ms: AtomicI64,
    access_seq: AtomicU64,
    access_count: AtomicU64,
}

impl Slot {
    fn new(response: TranslationResponse, now: DateTime<Utc>, seq: u64) -> Self {
        Self {
            response,
            created_at: now,
            last_accessed_ms: AtomicI64::new(now.timestamp_millis()),
            access_seq: AtomicU64::new(seq),
            access_count: AtomicU64::new(0),
        }
    }

    fn touch(&self, now: DateTime<Utc>, seq: u64) {
        self.access_count.fetch_add(1, Ordering::Relaxed);
        self.access_seq.fetch_max(seq, Ordering::Relaxed);
        self.last_accessed_ms
            .fetch_max(now.timestamp_millis(), Ordering::Relaxed);
    }

    fn last_accessed(&self) -> i64 {
        self.last_accessed_ms.load(Ordering::Relaxed)
    }

    fn to_entry(&self, key: &CacheKey) -> CacheEntry {
        CacheEntry {
            key: key.clone(),
            response: self.response.clone(),
            created_at: self.created_at,
            last_accessed_at: DateTime::from_timestamp_millis(self.last_accessed())
                .unwrap_or(self.created_at),
            access_count: self.access_count.load(Ordering::Relaxed),
        }
    }

    fn from_entry(entry: CacheEntry, seq: u64) -> (CacheKey, Self) {
        let slot = Self {
            response: entry.response,
            created_at: entry.created_at,
            last_accessed_ms: AtomicI64::new(entry.last_accessed_at.timestamp_millis()),
            access_seq: AtomicU64::new(seq),
            access_count: AtomicU64::new(entry.access_count),
        };
        (entry.key, slot)
    }
}

/// In-process result cache; concurrent readers, one writer at a time.
/// Racing writers on one key resolve last-write-wins.
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Slot>>,
    policy: CachePolicy,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl MemoryCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<TranslationResponse> {
        let started = Instant::now();
        let entries = self.entries.read().await;

        match entries.get(key) {
            Some(slot) => {
                slot.touch(now, self.tick());
                self.hits.fetch_add(1, Ordering::Relaxed);

                Some(slot.response.from_cache(started.elapsed()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn put_at(&self, key: CacheKey, response: TranslationResponse, now: DateTime<Utc>) {
        if !response.success || response.is_cache_sourced() {
            tracing::debug!("Not caching {:?} response for {}", response.outcome, key);
            return;
        }

        let mut entries = self.entries.write().await;
        let seq = self.tick();
        entries.insert(key, Slot::new(response, now, seq));
        self.evict(&mut entries, now);
    }

    fn evict(&self, entries: &mut HashMap<CacheKey, Slot>, now: DateTime<Utc>) {
        let before = entries.len();
        entries.retain(|_, slot| now - slot.created_at <= self.policy.max_age);
        let expired = before - entries.len();

        let mut dropped = 0;
        if entries.len() > self.policy.max_entries {
            let mut by_access: Vec<(u64, CacheKey)> = entries
                .iter()
                .map(|(key, slot)| (slot.access_seq.load(Ordering::Relaxed), key.clone()))
                .collect();
            by_access.sort_by_key(|(seq, _)| *seq);

            let excess = entries.len() - self.policy.max_entries;
            for (_, key) in by_access.into_iter().take(excess) {
                entries.remove(&key);
                dropped += 1;
            }
        }

        if expired + dropped > 0 {
            tracing::debug!(
                "Cache eviction: {} expired, {} over ceiling, {} remain",
                expired,
                dropped,
                entries.len()
            );
        }
    }

    async fn purge_at(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, slot| now - slot.created_at <= max_age);
        let purged = before - entries.len();

        if purged > 0 {
            tracing::info!("Purged {} cache entries older than {} days", purged, max_age.num_days());
        }
        purged
    }

    /// Every entry, oldest first
    pub async fn entries(&self) -> Vec<CacheEntry> {
        let entries = self.entries.read().await;
        let mut out: Vec<CacheEntry> = entries.iter().map(|(k, s)| s.to_entry(k)).collect();
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.key.as_str().cmp(b.key.as_str())));
        out
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Write all entries as JSON, replacing `path` atomically
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), CacheError> {
        let entries = self.entries().await;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, &entries)?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| CacheError::Io(e.error))?;

        tracing::debug!("Saved {} cache entries to {:?}", entries.len(), path);
        Ok(())
    }

    /// Rebuild a cache from a snapshot. A missing file yields an empty cache.
    /// Rows come back exactly as stored; age and ceiling apply on the next write.
    pub async fn load_snapshot(path: &Path, policy: CachePolicy) -> Result<Self, CacheError> {
        let cache = Self::new(policy);

        if !path.exists() {
            tracing::debug!("No cache snapshot at {:?}", path);
            return Ok(cache);
        }

        let content = fs::read_to_string(path)?;
        let mut stored: Vec<CacheEntry> = serde_json::from_str(&content)?;
        stored.sort_by(|a, b| {
            a.last_accessed_at
                .cmp(&b.last_accessed_at)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.key.as_str().cmp(b.key.as_str()))
        });

        {
            let mut entries = cache.entries.write().await;
            for entry in stored {
                let (key, slot) = Slot::from_entry(entry, cache.tick());
                entries.insert(key, slot);
            }
            tracing::info!("Loaded {} cache entries from {:?}", entries.len(), path);
        }

        Ok(cache)
    }
}

#[async_trait::async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<TranslationResponse> {
        self.get_at(key, Utc::now()).await
    }

    async fn put(&self, key: CacheKey, response: TranslationResponse) -> Result<(), CacheError> {
        self.put_at(key, response, Utc::now()).await;
        Ok(())
    }

    async fn purge_older_than(&self, max_age: Duration) -> usize {
        self.purge_at(max_age, Utc::now()).await
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
