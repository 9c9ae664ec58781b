pub(crate) mod check;
pub(crate) mod config;
pub(crate) mod list;
pub(crate) mod show;
pub(crate) mod stats;

use folio_db::{Catalog, RequestScope};
use serde::Serialize;

use crate::CliError;
use crate::config::Settings;

/// Open the configured library, priming the statement cache unless
/// `engine.prime_statements` is off.
pub(crate) fn open_catalog(settings: &Settings) -> Result<Catalog, CliError> {
    let db_path = settings.require_db()?;
    if !db_path.exists() {
        return Err(CliError::database(format!(
            "No library database found at {}",
            db_path.display()
        )));
    }

    let catalog = Catalog::open(db_path, &settings.store_config(), settings.engine_config())?;
    if settings.prime_statements.value {
        catalog.prime(&RequestScope::new())?;
    }
    Ok(catalog)
}

/// Print `value` to stdout as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{text}");
    Ok(())
}

/// Truncate a string to a maximum width in characters, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}

/// Format a file size in human-readable form.
pub(crate) fn format_file_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes.max(0) as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes.max(0), UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Render a Unix timestamp as a calendar date.
pub(crate) fn format_date(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
