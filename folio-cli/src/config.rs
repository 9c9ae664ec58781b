//! Settings: `settings.toml`, environment variables and command-line flags.
//!
//! Priority for the library database: `--db` > `$FOLIO_DB` >
//! `$FOLIO_LIBRARY/metadata.db` > `library.db_path` > `library.path/metadata.db`.
//! Every other setting comes from the settings file or its default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_catalog::DEFAULT_PAGE_SIZE;
use folio_db::{EngineConfig, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::CliError;

pub(crate) const ENV_DB: &str = "FOLIO_DB";
pub(crate) const ENV_LIBRARY: &str = "FOLIO_LIBRARY";

/// Calibre's database file name inside a library folder.
const LIBRARY_DB_FILE: &str = "metadata.db";

/// Default settings file: `~/.config/folio/settings.toml`.
pub(crate) fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("folio").join("settings.toml"))
}

/// Where a setting's value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SettingSource {
    /// Given on the command line.
    Flag(&'static str),
    /// Loaded from an environment variable.
    EnvVar(&'static str),
    /// Loaded from the settings file.
    ConfigFile,
    /// Built-in default.
    Default,
    /// Not set anywhere.
    Missing,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "flag {}", flag),
            Self::EnvVar(var) => write!(f, "env ${}", var),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
            Self::Missing => write!(f, "not set"),
        }
    }
}

/// A resolved value and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Setting<T> {
    pub value: T,
    pub source: SettingSource,
}

impl<T> Setting<T> {
    fn new(value: T, source: SettingSource) -> Self {
        Self { value, source }
    }

    /// File value if present, otherwise the default.
    fn from_file(value: Option<T>, default: T) -> Self {
        match value {
            Some(v) => Self::new(v, SettingSource::ConfigFile),
            None => Self::new(default, SettingSource::Default),
        }
    }
}

// ── File format ─────────────────────────────────────────────────────────────

/// TOML settings file format.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SettingsFile {
    library: LibrarySection,
    store: StoreSection,
    engine: EngineSection,
    display: DisplaySection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct LibrarySection {
    path: Option<PathBuf>,
    db_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct StoreSection {
    pool_size: Option<usize>,
    busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct EngineSection {
    max_search_scan: Option<usize>,
    prime_statements: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
struct DisplaySection {
    per_page: Option<i64>,
}

impl SettingsFile {
    pub(crate) fn parse(contents: &str) -> Result<Self, CliError> {
        toml::from_str(contents).map_err(|e| CliError::config(format!("Invalid settings: {e}")))
    }
}

// ── Effective settings ──────────────────────────────────────────────────────

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub(crate) struct Overrides {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Effective settings after merging every source.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    /// Settings file consulted, if a location could be determined.
    pub file: Option<PathBuf>,
    pub file_loaded: bool,
    pub db_path: Setting<Option<PathBuf>>,
    pub pool_size: Setting<usize>,
    pub busy_timeout_ms: Setting<u64>,
    pub max_search_scan: Setting<Option<usize>>,
    pub prime_statements: Setting<bool>,
    pub per_page: Setting<i64>,
}

impl Settings {
    /// Load settings from the environment, the settings file and `overrides`.
    ///
    /// A missing default settings file is not an error; a missing file
    /// named with `--config` is.
    pub(crate) fn load(overrides: &Overrides) -> Result<Self, CliError> {
        let path = overrides.config.clone().or_else(settings_path);
        let file = match &path {
            Some(p) => read_settings_file(p, overrides.config.is_some())?,
            None => None,
        };
        Ok(Self::resolve(path, file, overrides, |var| {
            std::env::var(var).ok()
        }))
    }

    fn resolve(
        path: Option<PathBuf>,
        file: Option<SettingsFile>,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file_loaded = file.is_some();
        let file = file.unwrap_or_default();
        let env = |var: &str| env(var).filter(|v| !v.is_empty());

        let db_path = if let Some(db) = &overrides.db {
            Setting::new(Some(db.clone()), SettingSource::Flag("--db"))
        } else if let Some(db) = env(ENV_DB) {
            Setting::new(Some(PathBuf::from(db)), SettingSource::EnvVar(ENV_DB))
        } else if let Some(library) = env(ENV_LIBRARY) {
            Setting::new(
                Some(Path::new(&library).join(LIBRARY_DB_FILE)),
                SettingSource::EnvVar(ENV_LIBRARY),
            )
        } else if let Some(db) = file.library.db_path {
            Setting::new(Some(db), SettingSource::ConfigFile)
        } else if let Some(library) = file.library.path {
            Setting::new(Some(library.join(LIBRARY_DB_FILE)), SettingSource::ConfigFile)
        } else {
            Setting::new(None, SettingSource::Missing)
        };

        let store = StoreConfig::default();
        let busy_default = u64::try_from(store.busy_timeout.as_millis()).unwrap_or(u64::MAX);
        let per_page_default = i64::try_from(DEFAULT_PAGE_SIZE).unwrap_or(i64::MAX);

        Self {
            file: path,
            file_loaded,
            db_path,
            pool_size: Setting::from_file(file.store.pool_size, store.pool_size),
            busy_timeout_ms: Setting::from_file(file.store.busy_timeout_ms, busy_default),
            max_search_scan: match file.engine.max_search_scan {
                Some(cap) => Setting::new(Some(cap), SettingSource::ConfigFile),
                None => Setting::new(None, SettingSource::Default),
            },
            prime_statements: Setting::from_file(file.engine.prime_statements, true),
            per_page: Setting::from_file(file.display.per_page, per_page_default),
        }
    }

    /// The library database path, or a config error explaining how to set it.
    pub(crate) fn require_db(&self) -> Result<&Path, CliError> {
        self.db_path.value.as_deref().ok_or_else(|| {
            CliError::config(format!(
                "No library database. Pass --db, set ${ENV_DB} or ${ENV_LIBRARY}, \
                 or add library.path to the settings file"
            ))
        })
    }

    pub(crate) fn store_config(&self) -> StoreConfig {
        StoreConfig {
            pool_size: self.pool_size.value,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms.value),
        }
    }

    pub(crate) fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_search_scan: self.max_search_scan.value,
        }
    }
}

#[cfg(test)]
impl Settings {
    /// Settings with no file, no environment and no flags.
    pub(crate) fn defaults() -> Self {
        Self::resolve(None, None, &Overrides::default(), |_| None)
    }
}

fn read_settings_file(path: &Path, required: bool) -> Result<Option<SettingsFile>, CliError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            log::debug!("Loaded settings from {}", path.display());
            SettingsFile::parse(&contents).map(Some)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => Ok(None),
        Err(e) => Err(CliError::config(format!(
            "Cannot read {}: {e}",
            path.display()
        ))),
    }
}
