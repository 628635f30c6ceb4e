use lexis_config::Config;

use super::{LanguageArgs, print_json};
use crate::state::AppState;

pub async fn meanings(config: Config, word: &str, langs: &LanguageArgs) -> anyhow::Result<()> {
    let state = AppState::load(config).await;
    let result = state.dictionary.lookup_meanings(word, &langs.from, &langs.to)?;
    print_json(&result)
}

pub async fn reverse(config: Config, word: &str, langs: &LanguageArgs) -> anyhow::Result<()> {
    let state = AppState::load(config).await;
    let result = state
        .dictionary
        .lookup_reverse_translations(word, &langs.from, &langs.to)?;
    print_json(&result)
}

pub async fn search(
    config: Config,
    query: &str,
    langs: &LanguageArgs,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.dictionary.search_limit);
    let state = AppState::load(config).await;
    let words = state
        .dictionary
        .search_words(query, &langs.from, &langs.to, limit)?;
    print_json(&words)
}
