use lexis_config::Config;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use super::{LanguageArgs, print_json};
use crate::state::AppState;

pub async fn run(
    config: Config,
    text: &str,
    langs: &LanguageArgs,
    use_cache: bool,
) -> anyhow::Result<()> {
    let state = AppState::load(config).await;

    // Ctrl+C cancels; an in-flight provider call is still awaited
    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if signal::ctrl_c().await.is_ok() {
                tracing::info!("Cancellation requested");
                cancel.cancel();
            }
        }
    });

    let response = state
        .orchestrator
        .translate_with_cancel(text, &langs.from, &langs.to, use_cache, &cancel)
        .await;
    watcher.abort();

    if use_cache {
        state.persist_cache().await;
    }

    print_json(&response)
}
