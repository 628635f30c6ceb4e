pub mod builder;
pub mod engine;
pub mod error;
pub mod pack;
pub mod registry;
pub mod store;
pub mod verify;

#[cfg(test)]
mod fixtures;

pub use builder::{BuildStats, DefaultQualityScorer, PackBuilder, QualityScorer, RawEntry};
pub use engine::{DictionaryLookup, DictionaryLookupEngine, LookupLimits};
pub use error::PackError;
pub use pack::{PackBundle, PackMetadata, PackType};
pub use registry::{DictionarySource, PackRegistry, PackSummary};
pub use store::PackStore;
pub use verify::{VerificationReport, minimum_entries, verify_pack};
