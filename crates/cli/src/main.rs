//! BugStash CLI: the main entry point.
//!
//! Commands:
//! - `ask`     : Ask the assistant about a bug
//! - `search`  : Search saved solutions directly
//! - `suggest` : Ask, then list follow-up questions
//! - `doctor`  : Diagnose configuration
//! - `config`  : Show the effective configuration
//! - `onboard` : Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "bugstash",
    about = "BugStash — search and reuse fixes for the bugs you've already solved",
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
    /// Ask the assistant about a bug or error
    Ask {
        /// The question, error message, or stack trace
        prompt: String,

        /// Maximum search results per search
        #[arg(short, long)]
        limit: Option<u32>,

        /// Print the whole result as JSON
        #[arg(long)]
        json: bool,

        /// Show which searches were run
        #[arg(long)]
        trace: bool,
    },

    /// Search saved solutions
    Search {
        query: String,

        #[arg(short, long)]
        limit: Option<u32>,

        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the assistant, then suggest follow-up questions
    Suggest {
        prompt: String,

        /// Number of suggestions
        #[arg(short, long)]
        count: Option<usize>,
    },

    /// Diagnose configuration
    Doctor,

    /// Show the effective configuration (secrets redacted)
    Config,

    /// Write a default config file
    Onboard,
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
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask {
            prompt,
            limit,
            json,
            trace,
        } => commands::ask::run(prompt, limit, json, trace).await?,
        Commands::Search {
            query,
            limit,
            offset,
            json,
        } => commands::search::run(query, limit, offset, json).await?,
        Commands::Suggest { prompt, count } => commands::suggest::run(prompt, count).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Config => commands::config_cmd::show().await?,
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
