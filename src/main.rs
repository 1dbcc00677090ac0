//! # finlib CLI
//!
//! Browses a financial document service from the terminal and can run a
//! reference copy of that service locally.
//!
//! ## Usage
//!
//! ```bash
//! finlib --config ./config/finlib.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `finlib link <input>` | Canonicalize a shareable link |
//! | `finlib list` | Fetch and print one page of documents |
//! | `finlib browse` | Interactive list session |
//! | `finlib get <id>` | Print a document |
//! | `finlib categories` | Print categories |
//! | `finlib suggest <query>` | Print title suggestions |
//! | `finlib serve` | Run the reference document service |
//!
//! ## Examples
//!
//! ```bash
//! # Start the reference service on the configured bind address
//! finlib serve --config ./config/finlib.toml
//!
//! # Second page of insurance documents
//! finlib list --query 보험 --page 2
//!
//! # Reopen a view someone shared
//! finlib browse --link 'query=%EB%B3%B4%ED%97%98&page=2'
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use finlib::browse::{self, ListArgs};
use finlib::{config, logging, server};

/// finlib: browse a financial document library.
///
/// All commands except `link` read a TOML configuration file. See
/// `config/finlib.example.toml` for every setting.
#[derive(Parser)]
#[command(
    name = "finlib",
    about = "Browse a financial document library",
    version,
    long_about = "finlib lists, filters and pages through documents served by a financial \
    document service, keeps the current view as a shareable link, and can run a reference \
    copy of the service from a JSON catalog."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/finlib.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a shareable link and the state it encodes.
    ///
    /// Accepts a bare query string, one starting with `?`, or a full URL.
    /// Invalid values are corrected to defaults.
    Link {
        /// The link to decode.
        input: String,
    },

    /// Fetch and print one page of documents.
    ///
    /// Filter flags are applied on top of `--link`; changing any filter
    /// returns to page 1 unless `--page` is also given.
    List {
        /// Start from a shareable link.
        #[arg(long)]
        link: Option<String>,

        /// Free-text query (empty clears it).
        #[arg(long)]
        query: Option<String>,

        /// Category id (empty clears it).
        #[arg(long)]
        category: Option<String>,

        /// Featured filter: `true` or `false` (empty clears it).
        #[arg(long)]
        featured: Option<String>,

        /// Page number, starting at 1.
        #[arg(long)]
        page: Option<u32>,
    },

    /// Interactive session over stdin. Type `help` for commands.
    Browse {
        /// Start from a shareable link.
        #[arg(long)]
        link: Option<String>,
    },

    /// Print a document by id. Counts as a view.
    Get {
        /// Document id.
        id: i64,
    },

    /// Print the document categories.
    Categories,

    /// Print up to five titles matching a query.
    Suggest {
        /// Text to match.
        query: String,
    },

    /// Serve the JSON catalog over HTTP.
    ///
    /// Binds `[server].bind` and reads `[server].catalog`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Link decoding needs no config
    if let Commands::Link { input } = &cli.command {
        return browse::run_link(input);
    }

    let cfg = config::load_config(&cli.config)?;
    logging::init(&cfg.logging)?;

    match cli.command {
        Commands::Link { .. } => unreachable!(),
        Commands::List {
            link,
            query,
            category,
            featured,
            page,
        } => {
            let args = ListArgs {
                link,
                query,
                category,
                featured,
                page,
            };
            browse::run_list(&cfg, &args).await?;
        }
        Commands::Browse { link } => {
            browse::run_browse(&cfg, link.as_deref()).await?;
        }
        Commands::Get { id } => {
            browse::run_get(&cfg, id).await?;
        }
        Commands::Categories => {
            browse::run_categories(&cfg).await?;
        }
        Commands::Suggest { query } => {
            browse::run_suggest(&cfg, &query).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
