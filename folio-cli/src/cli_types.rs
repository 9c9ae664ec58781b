//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Browse a Calibre library from the command line", long_about = None)]
pub(crate) struct Cli {
    /// Library database file (overrides FOLIO_DB and the settings file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Settings file to read instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (logs every SQL statement)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Paging, sorting and search arguments shared by the list commands.
#[derive(Args, Clone, Debug)]
pub(crate) struct ListArgs {
    /// Show one record in detail instead of a listing
    pub id: Option<i64>,

    /// Sort field: `id`, or `title` for books and `name` for authors/series
    #[arg(short, long, default_value = "id")]
    pub sort: String,

    /// Sort direction: `asc` or `desc`
    #[arg(short, long, default_value = "asc")]
    pub order: String,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: i64,

    /// Results per page (defaults to `display.per_page`)
    #[arg(long)]
    pub per_page: Option<i64>,

    /// Search term; repeat to search for several
    #[arg(short, long = "term")]
    pub terms: Vec<String>,

    /// Require every search term to match instead of any
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List, search or show books
    Books(ListArgs),

    /// List, search or show authors
    Authors(ListArgs),

    /// List, search or show series
    Series(ListArgs),

    /// Show library statistics
    Stats,

    /// Verify the library schema and compile every catalog query
    Check,

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and their sources
    Show,

    /// Print the settings file path
    Path,
}
