//! # Sponsor Index CLI (`spx`)
//!
//! The `spx` binary prepares and serves the UK register of licensed
//! sponsors: it cleans the raw worker-sponsorship CSV, seeds the keyword
//! index, and queries it.
//!
//! ## Usage
//!
//! ```bash
//! spx --config ./config/spx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `spx init` | Create the entry table |
//! | `spx clean <input> --out <path>` | Merge the raw CSV to one row per organisation |
//! | `spx seed <input>` | Ingest the raw CSV into the keyword index |
//! | `spx search "<query>"` | Search organisations by name keywords |
//! | `spx get <id>` | Show one organisation by id |
//! | `spx stats` | Show index counts and size |

mod aggregate;
mod clean;
mod config;
mod db;
mod entries;
mod error;
mod get;
mod ingest;
mod keywords;
mod migrate;
mod models;
mod progress;
mod search;
mod stats;
mod store;
mod writer;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::store::sqlite::SqliteStore;

/// Sponsor Index CLI — keyword-indexed ingestion of the UK register of
/// licensed sponsors.
///
/// All commands except `clean` read a `--config` TOML file. See
/// `config/spx.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "spx",
    about = "Sponsor Index — keyword-indexed ingestion of the UK register of licensed sponsors",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/spx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the entry table.
    ///
    /// Creates the SQLite database file and the configured entry table.
    /// This command is idempotent — running it multiple times is safe.
    Init,

    /// Merge the raw CSV down to one row per organisation.
    ///
    /// Aggregates rows sharing an organisation name and writes them back
    /// out with the deduplicated routes joined by " | ". Does not touch
    /// the store.
    Clean {
        /// Path to the raw worker-sponsorship CSV.
        input: PathBuf,

        /// Output path for the cleaned CSV.
        #[arg(long)]
        out: PathBuf,
    },

    /// Ingest the raw CSV into the keyword index.
    ///
    /// Streams rows through the aggregator, builds one canonical entry
    /// plus one keyword entry per distinct name token, and writes them in
    /// concurrency-limited batches. Re-running seeds the same data again
    /// under fresh organisation ids; it does not upsert.
    Seed {
        /// Path to the raw worker-sponsorship CSV.
        input: PathBuf,

        /// Maximum number of rows to read.
        #[arg(long)]
        limit: Option<u64>,

        /// Aggregate and count without writing to the store.
        #[arg(long)]
        dry_run: bool,

        /// Progress output: off, human, or json. Defaults by TTY.
        #[arg(long)]
        progress: Option<String>,
    },

    /// Search organisations by name keywords.
    ///
    /// The query is tokenized the same way names are at ingestion;
    /// results are ranked by how many query keywords matched.
    Search {
        /// The search query string.
        query: String,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Show one organisation by its id.
    Get {
        /// Organisation id (as printed by `spx search`).
        id: String,
    },

    /// Show index counts and size.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Clean needs neither config nor store.
    if let Commands::Clean { input, out } = &cli.command {
        return clean::run_clean(input, out);
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Entry table initialized successfully.");
        }
        Commands::Clean { .. } => unreachable!(),
        Commands::Seed {
            input,
            limit,
            dry_run,
            progress,
        } => {
            let mode = match progress.as_deref() {
                None => progress::ProgressMode::default_for_tty(),
                Some("off") => progress::ProgressMode::Off,
                Some("human") => progress::ProgressMode::Human,
                Some("json") => progress::ProgressMode::Json,
                Some(other) => {
                    anyhow::bail!("Unknown progress mode: {}. Use off, human, or json.", other)
                }
            };
            let reporter = mode.reporter();
            let store: Arc<dyn store::Store> = Arc::new(SqliteStore::connect(&cfg).await?);
            ingest::run_seed(&cfg, store, &input, limit, dry_run, reporter.as_ref()).await?;
        }
        Commands::Search { query, limit } => {
            let store = SqliteStore::connect(&cfg).await?;
            search::run_search(&cfg, &store, &query, limit).await?;
        }
        Commands::Get { id } => {
            let store = SqliteStore::connect(&cfg).await?;
            get::run_get(&store, &id).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
