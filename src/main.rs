//! Main entry point for the opus-mt translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opus_translator::cli::commands::{self, Commands};
use opus_translator::TranslatorConfig;

/// Translate text with Helsinki-NLP opus-mt models
#[derive(Parser, Debug)]
#[command(name = "opus-translator", version, about, long_about = None)]
struct Args {
    /// Configuration file (toml, json or yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}={}", env!("CARGO_CRATE_NAME"), log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TranslatorConfig::load(args.config.as_deref())?;

    // Execute command
    match args.command {
        Some(Commands::Serve { host, port }) => {
            commands::handle_serve(config, host, port).await?;
        }
        Some(Commands::Translate { from, to, text }) => {
            commands::handle_translate(config, from, to, text).await?;
        }
        Some(Commands::Languages { json }) => {
            commands::handle_languages(&config, json)?;
        }
        Some(Commands::Probe { from }) => {
            commands::handle_probe(config, from).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
