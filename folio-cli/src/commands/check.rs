use folio_db::{Catalog, QueryKey, RequestScope};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::config::Settings;

/// Open the library (which checks its schema) and compile every catalog
/// query against it. Fails if any query does not compile.
pub(crate) fn run_check(settings: &Settings) -> Result<(), CliError> {
    let db_path = settings.require_db()?;
    log::info!("Checking {}", db_path.display());

    let catalog = Catalog::open(db_path, &settings.store_config(), settings.engine_config())?;
    log::info!(
        "  {} schema has every required table",
        "ok".if_supports_color(Stdout, |t| t.green())
    );

    let report = catalog.prime(&RequestScope::new())?;
    log::info!(
        "  {} {} of {} catalog queries compiled",
        "ok".if_supports_color(Stdout, |t| t.green()),
        report.compiled,
        QueryKey::all().len()
    );

    catalog.close()?;
    Ok(())
}
