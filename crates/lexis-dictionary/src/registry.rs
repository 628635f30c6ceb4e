use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use lexis_core::{LanguagePair, LexisError};
use serde::Serialize;

use crate::error::PackError;
use crate::pack::PackBundle;
use crate::store::PackStore;

/// Read access to installed dictionary packs
pub trait DictionarySource: Send + Sync {
    /// Changes whenever a pack is installed or removed
    fn generation(&self) -> u64;

    /// Every installed (source, target) pair
    fn installed_pairs(&self) -> Result<Vec<LanguagePair>, LexisError>;

    /// Store serving exactly `pair`, if installed
    fn pack(&self, pair: &LanguagePair) -> Result<Option<Arc<PackStore>>, LexisError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    pub pack_id: String,
    pub word_groups: usize,
    pub meanings: usize,
    pub reverse_entries: usize,
}

impl PackSummary {
    fn of(store: &PackStore) -> Self {
        Self {
            pack_id: store.metadata().pack_id.clone(),
            word_groups: store.group_count(),
            meanings: store.meaning_count(),
            reverse_entries: store.reverse_count(),
        }
    }
}

/// Installed packs keyed by language pair.
///
/// Each pack is an immutable `Arc<PackStore>`; install and remove swap
/// whole stores under a short write lock, so readers holding an `Arc`
/// keep a consistent view.
#[derive(Default)]
pub struct PackRegistry {
    packs: RwLock<HashMap<LanguagePair, Arc<PackStore>>>,
    generation: AtomicU64,
}

impl PackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and install a bundle, replacing any pack for the same pair
    pub fn install(&self, bundle: PackBundle) -> Result<PackSummary, PackError> {
        let store = Arc::new(PackStore::from_bundle(bundle)?);
        let pair = store.language_pair().clone();
        let summary = PackSummary::of(&store);

        {
            let mut packs = self.packs.write().map_err(|_| poisoned())?;
            if packs.insert(pair.clone(), store).is_some() {
                tracing::info!("Replaced installed pack {pair}");
            }
            self.generation.fetch_add(1, Ordering::AcqRel);
        }

        tracing::info!(
            "Installed pack {} ({} word groups, {} meanings, {} reverse entries)",
            summary.pack_id,
            summary.word_groups,
            summary.meanings,
            summary.reverse_entries
        );

        Ok(summary)
    }

    pub fn install_from_file(&self, path: &Path) -> Result<PackSummary, PackError> {
        self.install(PackBundle::load_from_file(path)?)
    }

    /// Install every `*.json` bundle in `dir`. Packs that fail to load are
    /// logged and skipped.
    pub fn load_dir(&self, dir: &Path) -> Result<Vec<PackSummary>, PackError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut installed = Vec::new();
        for path in paths {
            match self.install_from_file(&path) {
                Ok(summary) => installed.push(summary),
                Err(e) => tracing::warn!("Failed to install pack from {}: {}", path.display(), e),
            }
        }

        Ok(installed)
    }

    /// Remove a pack by id ("de-en"). Its word groups, meanings and reverse
    /// entries go with it.
    pub fn remove(&self, pack_id: &str) -> Result<bool, PackError> {
        let pair = LanguagePair::from_pack_id(pack_id)?;

        let removed = {
            let mut packs = self.packs.write().map_err(|_| poisoned())?;
            let removed = packs.remove(&pair).is_some();
            if removed {
                self.generation.fetch_add(1, Ordering::AcqRel);
            }
            removed
        };

        if removed {
            tracing::info!("Removed pack {pack_id}");
        } else {
            tracing::debug!("Pack {pack_id} not installed, nothing to remove");
        }

        Ok(removed)
    }

    pub fn summaries(&self) -> Result<Vec<PackSummary>, LexisError> {
        let packs = self.packs.read().map_err(|_| poisoned())?;
        let mut summaries: Vec<_> = packs.values().map(|s| PackSummary::of(s)).collect();
        summaries.sort_by(|a, b| a.pack_id.cmp(&b.pack_id));
        Ok(summaries)
    }
}

impl DictionarySource for PackRegistry {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn installed_pairs(&self) -> Result<Vec<LanguagePair>, LexisError> {
        let packs = self.packs.read().map_err(|_| poisoned())?;
        Ok(packs.keys().cloned().collect())
    }

    fn pack(&self, pair: &LanguagePair) -> Result<Option<Arc<PackStore>>, LexisError> {
        let packs = self.packs.read().map_err(|_| poisoned())?;
        Ok(packs.get(pair).cloned())
    }
}

fn poisoned() -> LexisError {
    LexisError::Storage("pack registry lock poisoned".to_string())
}
