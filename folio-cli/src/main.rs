//! folio CLI
//!
//! Command-line browser for a Calibre library: list, search and show books,
//! authors and series.

mod cli_types;
mod commands;
mod config;
mod error;

use std::io::Write;

use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

use cli_types::{Cli, Commands, ConfigAction};
use config::{Overrides, Settings};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logger(&cli);

    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let overrides = Overrides {
        db: cli.db,
        config: cli.config,
    };
    let settings = Settings::load(&overrides)?;
    let json = cli.json;

    match cli.command {
        Commands::Books(args) => commands::list::run_books(&settings, &args, json),
        Commands::Authors(args) => commands::list::run_authors(&settings, &args, json),
        Commands::Series(args) => commands::list::run_series(&settings, &args, json),
        Commands::Stats => commands::stats::run_stats(&settings, json),
        Commands::Check => commands::check::run_check(&settings),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings, json),
            ConfigAction::Path => commands::config::run_config_path(&settings),
        },
    }
}

/// Human output goes through `log::info!` to stdout. With `--json` the
/// document owns stdout and log records move to stderr.
fn init_logger(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let verbose = cli.verbose;

    let mut builder = Builder::from_env(Env::default().default_filter_or(level.as_str()));
    if cli.verbose || cli.quiet {
        builder.filter_level(level);
    }
    builder
        .target(if cli.json { Target::Stderr } else { Target::Stdout })
        .format(move |buf, record| {
            if verbose {
                writeln!(
                    buf,
                    "[{} {:<5} {}] {}",
                    chrono::Local::now().format("%H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            } else if record.level() <= log::Level::Warn {
                writeln!(buf, "{}: {}", record.level().as_str().to_lowercase(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .init();
}

/// Log an empty line (keeps output spacing consistent with log records).
pub(crate) fn log_blank() {
    log::info!("");
}
