use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lexis_config::Config;

mod commands;
mod logging;
mod state;


use self::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "lexis", about = "Offline-first word and phrase translation")]
struct Cli {
    /// JSON config file; defaults plus environment overrides when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level, overrides the configured one
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Force JSON (true) or human (false) log output
    #[arg(long, global = true)]
    log_json: Option<bool>,
    #[command(subcommand)]
    command: Command,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::new()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lexis: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.log_json.is_some() {
        config.logging.json = cli.log_json;
    }
    logging::init(&config.logging);

    match commands::run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
