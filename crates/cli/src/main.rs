//! Parley CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write a default config file
//! - `chat`    — Send one message through the gateway
//! - `models`  — List the model registry
//! - `status`  — Per-provider availability report

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley — conversational gateway with model routing and fallback",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file to ~/.parley/config.toml
    Init,

    /// Send a message and print the response
    Chat {
        /// The message to send
        #[arg(short, long)]
        message: String,

        /// Session key for conversation continuity
        #[arg(short, long)]
        session: Option<String>,

        /// Only consider offline-capable (local) models
        #[arg(long)]
        offline: bool,

        /// Print response fragments as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// List the model registry
    Models,

    /// Show per-provider availability
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Chat {
            message,
            session,
            offline,
            stream,
        } => commands::chat::run(message, session, offline, stream).await?,
        Commands::Models => commands::models::run().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
