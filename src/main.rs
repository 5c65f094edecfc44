use anyhow::{Context, Result};
use clap::Parser;
use ollama_bridge::config::{self, Config};
use ollama_bridge::discord;
use ollama_bridge::ollama::OllamaClient;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ollama-bridge")]
#[command(about = "Discord slash-command bridge for a local Ollama server", long_about = None)]
struct Args {
    /// Verbose output (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log to console only, skip the debug.log file
    #[arg(long = "no-log-file")]
    no_log_file: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbose.min(3);

    let log_path = if args.no_log_file {
        None
    } else {
        Some(Config::log_file_path())
    };
    ollama_bridge::init_tracing(verbosity, log_path);

    info!("ollama-bridge {} starting", Config::version());

    let config = Arc::new(Config::from_env());
    config
        .ensure_data_dir()
        .context("Failed to create data directory")?;

    let ollama = OllamaClient::new(&config.ollama_base_url())
        .context("Failed to build Ollama client")?;

    let token = config::get_discord_token()
        .context("No Discord token (set DISCORD_BOT_TOKEN or .config.env)")?;

    discord::run_discord_client(token, config, ollama).await
}
