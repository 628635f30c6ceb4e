use std::path::PathBuf;

use clap::{Args, Subcommand};
use lexis_config::Config;
use serde::Serialize;

pub mod cache;
pub mod lookup;
pub mod pack;
pub mod translate;

pub use self::cache::CacheCommand;

#[derive(Args, Debug, Clone)]
pub struct LanguageArgs {
    /// Source language code
    #[arg(long)]
    pub from: String,
    /// Target language code
    #[arg(long)]
    pub to: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve text through cache, dictionary and providers
    Translate {
        text: String,
        #[command(flatten)]
        langs: LanguageArgs,
        #[arg(long)]
        no_cache: bool,
    },
    /// Cyclable meanings for one word
    Lookup {
        word: String,
        #[command(flatten)]
        langs: LanguageArgs,
    },
    /// Target -> source candidates from the reverse index
    Reverse {
        word: String,
        #[command(flatten)]
        langs: LanguageArgs,
    },
    /// Typeahead over headwords
    Search {
        query: String,
        #[command(flatten)]
        langs: LanguageArgs,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Build a pack from `lemma<TAB>definition[<TAB>pos]` rows
    BuildPack {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        langs: LanguageArgs,
        #[arg(long)]
        out: PathBuf,
        /// Skip the reverse index
        #[arg(long)]
        forward_only: bool,
    },
    /// Check a pack's integrity and size
    VerifyPack {
        path: PathBuf,
        #[arg(long)]
        min_entries: Option<usize>,
    },
    /// Result cache maintenance
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

pub async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    match command {
        Command::Translate {
            text,
            langs,
            no_cache,
        } => translate::run(config, &text, &langs, !no_cache).await,
        Command::Lookup { word, langs } => lookup::meanings(config, &word, &langs).await,
        Command::Reverse { word, langs } => lookup::reverse(config, &word, &langs).await,
        Command::Search {
            query,
            langs,
            limit,
        } => lookup::search(config, &query, &langs, limit).await,
        Command::BuildPack {
            input,
            langs,
            out,
            forward_only,
        } => print_json(&pack::build(&input, &langs, &out, forward_only)?),
        Command::VerifyPack { path, min_entries } => pack::verify_command(&path, min_entries),
        Command::Cache { command } => cache::run(config, command).await,
    }
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
