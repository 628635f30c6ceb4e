use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use lexis_core::{LanguageCode, LanguagePair, Meaning, ReverseLookupEntry, WordGroup};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::PackError;

pub const SCHEMA_VERSION: &str = "2.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackType {
    /// Forward meanings plus a reverse index
    Bidirectional,
    Forward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackMetadata {
    pub pack_id: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub pack_type: PackType,
    pub schema_version: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub converted_from: Option<String>,
}

impl PackMetadata {
    pub fn new(pair: &LanguagePair, pack_type: PackType) -> Self {
        Self {
            pack_id: pair.pack_id(),
            source_language: pair.source.clone(),
            target_language: pair.target.clone(),
            pack_type,
            schema_version: SCHEMA_VERSION.to_string(),
            created_at: Some(Utc::now()),
            converted_from: None,
        }
    }

    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }
}

/// Importable dictionary package: every table for one language pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackBundle {
    pub metadata: PackMetadata,
    #[serde(default)]
    pub word_groups: Vec<WordGroup>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub reverse_entries: Vec<ReverseLookupEntry>,
}

impl PackBundle {
    pub fn from_json(json: &str) -> Result<Self, PackError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, PackError> {
        tracing::info!("Loading pack from file: {}", path.display());
        let json = fs::read_to_string(path)?;
        let bundle = Self::from_json(&json)?;
        tracing::info!(
            "Loaded pack {} ({} word groups, {} meanings, {} reverse entries)",
            bundle.metadata.pack_id,
            bundle.word_groups.len(),
            bundle.meanings.len(),
            bundle.reverse_entries.len()
        );
        Ok(bundle)
    }

    /// Atomic write: serialize into a sibling temp file, then rename over `path`
    pub fn save_to_file(&self, path: &Path) -> Result<(), PackError> {
        let parent_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        temp_file
            .persist(path)
            .map_err(|e| PackError::Io(e.error))?;

        Ok(())
    }

    /// Pair declared by the metadata. Every row must agree with it.
    pub fn language_pair(&self) -> LanguagePair {
        self.metadata.language_pair()
    }

    /// Pair derived from the rows themselves, when they all agree
    pub fn derived_pair(&self) -> Option<LanguagePair> {
        let first = self.word_groups.first()?.language_pair();
        self.word_groups
            .iter()
            .all(|g| g.language_pair() == first)
            .then_some(first)
    }
}
