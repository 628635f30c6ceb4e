use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LexisError;

/// Language identifier (ISO 639-1 style: "en", "de", "es", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Validate and lowercase a language identifier. Codes must be at least
    /// two characters of ASCII letters, digits or underscores.
    pub fn parse(code: &str) -> Result<Self, LexisError> {
        let trimmed = code.trim();

        let well_formed = trimmed.len() >= 2
            && trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !well_formed {
            return Err(LexisError::InvalidLanguageCode(code.to_string()));
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = LexisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = LexisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered (source, target) pair. A dictionary pack serves exactly one pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: LanguageCode,
    pub target: LanguageCode,
}

impl LanguagePair {
    pub fn new(source: LanguageCode, target: LanguageCode) -> Self {
        Self { source, target }
    }

    /// Validate both codes, failing on the first malformed one
    pub fn parse(source: &str, target: &str) -> Result<Self, LexisError> {
        Ok(Self::new(
            LanguageCode::parse(source)?,
            LanguageCode::parse(target)?,
        ))
    }

    /// Parse a pack identifier such as "de-en"
    pub fn from_pack_id(pack_id: &str) -> Result<Self, LexisError> {
        let (source, target) = pack_id
            .split_once('-')
            .ok_or_else(|| LexisError::InvalidLanguageCode(pack_id.to_string()))?;
        Self::parse(source, target)
    }

    pub fn inverse(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }

    /// Canonical pack identifier, "source-target"
    pub fn pack_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_codes() {
        assert_eq!(
            LanguageCode::parse("e"),
            Err(LexisError::InvalidLanguageCode("e".to_string()))
        );
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("  ").is_err());
    }

    #[test]
    fn rejects_punctuation() {
        assert!(LanguageCode::parse("e n").is_err());
        assert!(LanguageCode::parse("de-en").is_err());
    }

    #[test]
    fn lowercases_and_trims() {
        let code = LanguageCode::parse(" DE ").unwrap();
        assert_eq!(code.as_str(), "de");
        assert_eq!(LanguageCode::parse("zh_hant").unwrap().as_str(), "zh_hant");
    }

    #[test]
    fn pack_id_round_trips_through_pair() {
        let pair = LanguagePair::from_pack_id("de-en").unwrap();
        assert_eq!(pair.source.as_str(), "de");
        assert_eq!(pair.target.as_str(), "en");
        assert_eq!(pair.pack_id(), "de-en");
        assert_eq!(pair.inverse().pack_id(), "en-de");
        assert!(LanguagePair::from_pack_id("deen").is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: LanguageCode = serde_json::from_str("\"ES\"").unwrap();
        assert_eq!(ok.as_str(), "es");
        assert!(serde_json::from_str::<LanguageCode>("\"x\"").is_err());
    }
}
