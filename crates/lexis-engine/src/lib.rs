pub mod orchestrator;
pub mod tier;

#[cfg(test)]
mod tests;

pub use orchestrator::{OrchestratorBuilder, TranslationOrchestrator};
pub use tier::{Tier, TierContext, TierOutcome};
