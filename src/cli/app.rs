//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{board, discover, shelves};
use crate::catalog::GoogleBooks;
use crate::domain::ShelfKey;
use crate::storage::{Config, Home};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(author, version, about = "Track the books you want to read, are reading, and have read")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory holding library.json and config.toml
    #[arg(long, global = true, env = "SHELF_HOME")]
    pub home: Option<PathBuf>,

    /// Catalog API base URL (overrides config)
    #[arg(long, global = true, env = "SHELF_CATALOG_URL")]
    pub catalog_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog for books
    Search {
        /// Free-text query (at least two characters)
        query: String,
    },

    /// Show book recommendations
    Recommend {
        /// Genre: random, nonfiction-books, or any catalog subject
        #[arg(long, short, default_value = "random")]
        genre: String,
    },

    /// Add a book to a shelf by catalog id
    Add {
        /// Catalog volume id
        id: String,

        /// Target shelf (to-read, reading, completed)
        #[arg(long, short)]
        shelf: Option<ShelfKey>,
    },

    /// Search and add one of the results
    Pick {
        /// Free-text query
        query: String,

        /// Which result to add (1-based, as listed by 'shelf search')
        #[arg(long, short, default_value = "1")]
        index: usize,

        /// Target shelf (to-read, reading, completed)
        #[arg(long, short)]
        shelf: Option<ShelfKey>,
    },

    /// Move a book to another shelf
    Move {
        /// Book id
        id: String,

        /// Destination shelf (to-read, reading, completed)
        shelf: ShelfKey,
    },

    /// Remove a book from a shelf
    Remove {
        /// Book id
        id: String,

        /// Shelf to remove it from (defaults to wherever it is)
        #[arg(long, short)]
        shelf: Option<ShelfKey>,
    },

    /// List shelf contents
    List {
        /// Only this shelf
        shelf: Option<ShelfKey>,
    },

    /// Show a shelved book
    Show {
        /// Book id
        id: String,
    },

    /// Show shelf counts
    Status,

    /// Interactive shelf board
    Board,
}

/// Per-invocation state shared by commands
pub struct Context {
    pub output: Output,
    pub home: Home,
}

impl Context {
    pub fn config(&self) -> &Config {
        self.home.config()
    }

    /// Shelf to use when a command does not name one
    pub fn shelf_or_default(&self, shelf: Option<ShelfKey>) -> ShelfKey {
        shelf.unwrap_or(self.config().library.default_shelf)
    }

    /// HTTP catalog client built from the effective config
    pub fn catalog(&self) -> Result<GoogleBooks> {
        Ok(GoogleBooks::new(&self.config().catalog)?)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shelf_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shelf_cli=warn"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = Home::resolve(cli.home.as_deref())?;
    let mut home = Home::open(&root)?;
    let config = std::mem::take(home.config_mut());
    *home.config_mut() = config.with_catalog_url(cli.catalog_url.as_deref());

    tracing::debug!(home = %home.root().display(), catalog = %home.config().catalog.base_url, "starting");

    let ctx = Context {
        output: Output::new(cli.format),
        home,
    };

    match cli.command {
        Commands::Search { query } => discover::search(&ctx, &query)?,
        Commands::Recommend { genre } => discover::recommend(&ctx, &genre)?,

        Commands::Add { id, shelf } => shelves::add(&ctx, &id, shelf)?,
        Commands::Pick { query, index, shelf } => shelves::pick(&ctx, &query, index, shelf)?,
        Commands::Move { id, shelf } => shelves::move_book(&ctx, &id, shelf)?,
        Commands::Remove { id, shelf } => shelves::remove(&ctx, &id, shelf)?,
        Commands::List { shelf } => shelves::list(&ctx, shelf)?,
        Commands::Show { id } => shelves::show(&ctx, &id)?,
        Commands::Status => shelves::status(&ctx)?,

        Commands::Board => board::run(&ctx)?,
    }

    tracing::debug!("command completed");
    Ok(())
}
