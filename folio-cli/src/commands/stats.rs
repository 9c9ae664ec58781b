use folio_db::RequestScope;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::config::Settings;
use crate::{CliError, log_blank};

use super::{format_file_size, open_catalog, print_json};

pub(crate) fn run_stats(settings: &Settings, json: bool) -> Result<(), CliError> {
    let catalog = open_catalog(settings)?;
    let db_path = settings.require_db()?;
    let books = catalog.book_count(&RequestScope::new())?;
    let size = std::fs::metadata(db_path)?.len();
    let statements = catalog.statements().len();
    catalog.close()?;

    if json {
        return print_json(&serde_json::json!({
            "database": db_path,
            "books": books,
            "database_bytes": size,
            "statements": statements,
        }));
    }

    log::info!(
        "{}",
        "Library Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    log_blank();
    log::info!("  Books:          {:>8}", books);
    log::info!(
        "  Database size:  {:>8}",
        format_file_size(i64::try_from(size).unwrap_or(i64::MAX))
    );
    log::info!("  Cached queries: {:>8}", statements);

    Ok(())
}
