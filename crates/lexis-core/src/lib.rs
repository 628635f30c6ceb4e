pub mod error;
pub mod language;
pub mod model;
pub mod preprocess;
pub mod types;

pub use error::LexisError;
pub use language::{LanguageCode, LanguagePair};
pub use model::{Meaning, MeaningId, ReverseLookupEntry, WordGroup, WordGroupId};
pub use preprocess::{DefaultPreprocessor, Preprocessor};
pub use types::{
    DirectionResolution, LookupDirection, MeaningCandidate, MeaningLookupResult, Outcome,
    ProviderSource, ReverseCandidate, ReverseLookupResult, TranslationRequest,
    TranslationResponse,
};
