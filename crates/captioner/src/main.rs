//! Captioner CLI - trigger-word captions for LoRA training image folders.
//!
//! For every image in a folder, Captioner asks a vision-language model for a
//! caption that refers to the subject by a trigger word, and writes it next
//! to the image as `<stem>.txt`.
//!
//! # Usage
//!
//! ```bash
//! # Caption a folder of garment photos (trigger word = folder name)
//! captioner caption ./SW_A
//!
//! # Caption portraits with an explicit trigger word
//! captioner caption ./model_A --template person --trigger-word model_A
//!
//! # View configuration
//! captioner config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Captioner - trigger-word captions for LoRA training image folders.
#[derive(Parser, Debug)]
#[command(name = "captioner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a caption file for every image in a directory
    Caption(cli::caption::CaptionArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Credentials may live in a .env file next to the dataset.
    let dotenv = dotenvy::dotenv();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match captioner_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `captioner config path`."
            );
            captioner_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    match dotenv {
        Ok(path) => tracing::debug!(".env read from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Could not load .env file: {e}"),
    }
    tracing::debug!("Captioner v{}", captioner_core::VERSION);

    match cli.command {
        Commands::Caption(args) => cli::caption::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
