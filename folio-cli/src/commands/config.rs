use std::fmt::Display;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::config::{Setting, SettingSource, Settings};
use crate::{CliError, log_blank};

use super::print_json;

/// Show effective settings and their sources.
pub(crate) fn run_config_show(settings: &Settings, json: bool) -> Result<(), CliError> {
    if json {
        return print_json(&serde_json::json!({
            "file": settings.file,
            "library": { "db_path": settings.db_path.value },
            "store": {
                "pool_size": settings.pool_size.value,
                "busy_timeout_ms": settings.busy_timeout_ms.value,
            },
            "engine": {
                "max_search_scan": settings.max_search_scan.value,
                "prime_statements": settings.prime_statements.value,
            },
            "display": { "per_page": settings.per_page.value },
        }));
    }

    log::info!(
        "{}",
        "folio Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    log_blank();

    match &settings.file {
        Some(p) if settings.file_loaded => {
            log::info!(
                "  Settings file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(loaded)".if_supports_color(Stdout, |t| t.green()),
            );
        }
        Some(p) => {
            log::info!(
                "  Settings file: {} {}",
                p.display().if_supports_color(Stdout, |t| t.cyan()),
                "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
        None => {
            log::info!(
                "  Settings file: {}",
                "could not determine path".if_supports_color(Stdout, |t| t.red()),
            );
        }
    }
    log_blank();

    let db = settings
        .db_path
        .value
        .as_ref()
        .map(|p| p.display().to_string());
    row("library.db_path", db, &settings.db_path.source);
    show_setting("store.pool_size", &settings.pool_size);
    show_setting("store.busy_timeout_ms", &settings.busy_timeout_ms);
    row(
        "engine.max_search_scan",
        settings.max_search_scan.value.map(|n| n.to_string()),
        &settings.max_search_scan.source,
    );
    show_setting("engine.prime_statements", &settings.prime_statements);
    show_setting("display.per_page", &settings.per_page);

    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path(settings: &Settings) -> Result<(), CliError> {
    match &settings.file {
        Some(p) => {
            log::info!("{}", p.display());
            Ok(())
        }
        None => Err(CliError::config("Could not determine config directory")),
    }
}

fn show_setting<T: Display>(name: &str, setting: &Setting<T>) {
    row(name, Some(setting.value.to_string()), &setting.source);
}

fn row(name: &str, value: Option<String>, source: &SettingSource) {
    let source_str = format!("({source})");
    match value {
        Some(v) => log::info!(
            "  {:<26} {} {}",
            name,
            v.if_supports_color(Stdout, |t| t.green()),
            source_str.if_supports_color(Stdout, |t| t.dimmed()),
        ),
        None => log::info!(
            "  {:<26} {}",
            name,
            "not set".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }
}
