use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Subcommand;
use lexis_cache::{CachePolicy, MemoryCache, ResultCache};
use lexis_config::Config;
use serde::Serialize;

use super::print_json;

#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Drop entries older than the maximum age
    Purge {
        /// Defaults to the configured maximum age
        #[arg(long)]
        max_age_days: Option<u32>,
    },
    /// Entry count of the persisted cache
    Stats,
}

#[derive(Debug, Serialize)]
pub struct PurgeSummary {
    pub purged: usize,
    pub remaining: usize,
}

fn snapshot_path(config: &Config) -> anyhow::Result<PathBuf> {
    config
        .cache
        .path
        .as_ref()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("no cache path configured (set cache.path or LEXIS_CACHE_PATH)"))
}

pub async fn purge(config: &Config, max_age_days: Option<u32>) -> anyhow::Result<PurgeSummary> {
    let path = snapshot_path(config)?;
    let cache = MemoryCache::load_snapshot(&path, CachePolicy::from_config(&config.cache))
        .await
        .with_context(|| format!("loading cache {}", path.display()))?;

    let days = max_age_days.unwrap_or(config.cache.max_age_days);
    let purged = cache
        .purge_older_than(chrono::Duration::days(i64::from(days)))
        .await;

    cache
        .save_snapshot(&path)
        .await
        .with_context(|| format!("saving cache {}", path.display()))?;

    Ok(PurgeSummary {
        purged,
        remaining: cache.len().await,
    })
}

pub async fn run(config: Config, command: CacheCommand) -> anyhow::Result<()> {
    match command {
        CacheCommand::Purge { max_age_days } => print_json(&purge(&config, max_age_days).await?),
        CacheCommand::Stats => {
            let path = snapshot_path(&config)?;
            let cache = MemoryCache::load_snapshot(&path, CachePolicy::from_config(&config.cache))
                .await
                .with_context(|| format!("loading cache {}", path.display()))?;
            print_json(&cache.stats().await)
        }
    }
}
