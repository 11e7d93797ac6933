//! # Pulp Bridge CLI (`pulp`)
//!
//! Runs the citation-page bridge from the command line: augment a saved or
//! live paper page with an "Open in Pulp" link, or talk to the companion
//! service directly.
//!
//! ## Usage
//!
//! ```bash
//! pulp [--config ./config/pulp.toml] [--strategy direct|relay] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pulp augment <page>` | Search for the page's paper and print the augmented HTML |
//! | `pulp search "<title>"` | List the companion service's matches for a title |
//! | `pulp open <file>` | Ask the companion service to open a file |
//! | `pulp view <path>` | Ask the companion service to show a file |
//! | `pulp list` | Print the companion service's library listing |
//! | `pulp short-list` | Print the title-pattern/file-name pairs the service matches on |
//! | `pulp encode "<title>"` | Print the encoded search query |
//!
//! ## Examples
//!
//! ```bash
//! # Augment a live arXiv abstract page and open the match
//! pulp augment https://arxiv.org/abs/1706.03762 --click
//!
//! # Same page, fetched through the relay context
//! pulp --strategy relay augment ./saved/1706.03762.html -o augmented.html
//!
//! # Check what the service knows about a title
//! pulp search "Attention Is All You Need"
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use pulp_bridge::augment;
use pulp_bridge::config::{self, Config, TransportStrategy};

/// Config file read when `--config` is not given, if it exists.
const DEFAULT_CONFIG_PATH: &str = "./config/pulp.toml";

/// Pulp Bridge CLI: finds the local copy of a paper through the Pulp
/// companion service and links to it from the paper's page.
#[derive(Parser)]
#[command(
    name = "pulp",
    about = "Pulp Bridge: link citation pages to local copies via the Pulp companion service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/pulp.toml` when present; otherwise built-in
    /// defaults are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Transport strategy, overriding `[transport].strategy`.
    #[arg(long, global = true, value_enum)]
    strategy: Option<TransportStrategy>,

    /// Companion service base URL, overriding `[service].base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Augment a page with an "Open in Pulp" link.
    ///
    /// Reads the citation title, searches the companion service, and prints
    /// the page HTML with the link prepended to the full-text list when a
    /// local copy exists. The page is printed unchanged otherwise.
    Augment {
        /// Page to augment: a file path or an http(s) URL.
        page: String,

        /// Activate the injected link, asking the service to open the file.
        #[arg(long)]
        click: bool,

        /// Write the HTML here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Search the companion service for a title.
    Search {
        /// Paper title, unencoded.
        title: String,
    },

    /// Ask the companion service to open a file.
    Open {
        /// File identifier as returned by `search`, passed through verbatim.
        file: String,
    },

    /// Ask the companion service to show a file.
    View {
        /// Path as the service knows it, passed through verbatim.
        path: String,
    },

    /// Print the companion service's library listing.
    List,

    /// Print the companion service's `[title regex, file name]` pairs.
    ShortList,

    /// Print the percent-encoded search query for a title.
    Encode {
        /// Paper title, unencoded.
        title: String,
    },
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            config::load_config(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => Config::default(),
    };

    if let Some(strategy) = cli.strategy {
        cfg.transport.strategy = strategy;
    }
    if let Some(base_url) = &cli.base_url {
        cfg.service.base_url = base_url.clone();
    }
    config::validate(&cfg)?;
    Ok(cfg)
}

fn init_logging(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Encode { title } = &cli.command {
        augment::run_encode(title);
        return Ok(());
    }

    let cfg = resolve_config(&cli)?;
    init_logging(&cfg);

    match cli.command {
        Commands::Augment {
            page,
            click,
            output,
        } => {
            augment::run_augment(&cfg, &page, click, output.as_deref()).await?;
        }
        Commands::Search { title } => {
            augment::run_search(&cfg, &title).await?;
        }
        Commands::Open { file } => {
            augment::run_open(&cfg, &file).await?;
        }
        Commands::View { path } => {
            augment::run_view(&cfg, &path).await?;
        }
        Commands::List => {
            augment::run_list(&cfg).await?;
        }
        Commands::ShortList => {
            augment::run_short_list(&cfg).await?;
        }
        Commands::Encode { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
