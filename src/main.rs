//! # SARAL CLI (`saral`)
//!
//! The `saral` binary loads welfare schemes into the local database and lets
//! you browse, search, translate and ask questions about them, or serve the
//! same operations over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! saral --config ./config/saral.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `saral init` | Create the SQLite database and run schema migrations |
//! | `saral load` | Collect schemes (live or seed) and re-seed the store |
//! | `saral list` | List stored schemes, optionally by category |
//! | `saral show <id>` | Show one scheme, optionally translated |
//! | `saral search "<term>"` | Substring search across scheme fields |
//! | `saral chat "<question>"` | Ask a question grounded in the scheme list |
//! | `saral translate <id> <lang>` | Translate a scheme (cached) |
//! | `saral simplify <id>` | Plain-language rewrite of a scheme |
//! | `saral explain <id>` | Two or three sentence explanation |
//! | `saral stats` | Database statistics |
//! | `saral export` / `import` | JSON snapshots |
//! | `saral serve` | Start the JSON HTTP API |
//!
//! Set `GOOGLE_API_KEY` (or the variable named by `llm.api_key_env`) to
//! enable translation and chat. Without it SARAL runs in limited mode.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use saral::{chat, config, export, get, migrate, portal, search, server, stats};

/// SARAL: welfare-scheme information portal.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/saral.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "saral",
    about = "SARAL: find, translate and ask about government welfare schemes",
    version,
    long_about = "SARAL collects welfare schemes from public listing pages (with a bundled \
    fallback dataset), stores them in SQLite, and offers search, translation, plain-language \
    simplification and grounded question answering via a CLI and a JSON HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/saral.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/saral.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Collect schemes and replace the stored set.
    ///
    /// Each source is scraped live and falls back to the bundled seed data
    /// when the page is unreachable or yields nothing. Cached translations
    /// are discarded.
    Load {
        /// Skip the network and load the bundled seed data.
        #[arg(long)]
        offline: bool,

        /// Also write the collected records to this JSON file.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// List stored schemes.
    List {
        /// Only show one category (`Telangana State`, `Central Government`, or `all`).
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one scheme by id.
    Show {
        id: i64,

        /// Display language. Non-English languages are translated and cached.
        #[arg(long, default_value = "English")]
        lang: String,
    },

    /// Search schemes by keyword.
    ///
    /// Matches title, description, category, eligibility and benefits; title matches
    /// rank first.
    Search {
        /// The search term.
        term: String,
    },

    /// Ask a question about the available schemes.
    Chat {
        /// The question.
        question: String,

        /// Answer language.
        #[arg(long, default_value = "English")]
        lang: String,
    },

    /// Translate a scheme into another language.
    Translate {
        id: i64,
        /// Target language, e.g. `Hindi` or `Telugu`.
        language: String,
    },

    /// Rewrite a scheme in plain language.
    Simplify { id: i64 },

    /// Explain a scheme in two or three simple sentences.
    Explain { id: i64 },

    /// Show database statistics.
    Stats,

    /// Export all schemes as a JSON snapshot.
    Export {
        /// Output file. Writes to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace stored schemes with those in a JSON snapshot.
    Import {
        /// Snapshot file written by `saral export`.
        path: PathBuf,
    },

    /// Start the JSON HTTP API.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("saral=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        tracing::debug!(path = %cli.config.display(), "config file not found, using defaults");
        config::Config::minimal()
    };

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Load { offline, snapshot } => {
            let portal = portal::Portal::open(&cfg).await?;
            let report = portal.load(offline, snapshot.as_deref()).await?;
            println!("Inserted {} schemes", report.inserted);
            println!(
                "  Telangana State:    {} ({})",
                report.regional.count,
                report.regional.origin.label()
            );
            println!(
                "  Central Government: {} ({})",
                report.national.count,
                report.national.origin.label()
            );
            if let Some(path) = snapshot {
                println!("Snapshot written to {}", path.display());
            }
            portal.close().await;
        }
        Commands::List { category } => {
            search::run_list(&cfg, category).await?;
        }
        Commands::Show { id, lang } => {
            get::run_get(&cfg, id, &lang).await?;
        }
        Commands::Search { term } => {
            search::run_search(&cfg, &term).await?;
        }
        Commands::Chat { question, lang } => {
            chat::run_chat(&cfg, &question, &lang).await?;
        }
        Commands::Translate { id, language } => {
            get::run_get(&cfg, id, &language).await?;
        }
        Commands::Simplify { id } => {
            get::run_simplify(&cfg, id).await?;
        }
        Commands::Explain { id } => {
            get::run_explain(&cfg, id).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Import { path } => {
            export::run_import(&cfg, &path).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
