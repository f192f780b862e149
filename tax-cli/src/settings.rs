use std::path::PathBuf;

use tax_core::DEFAULT_TAX_YEAR;
use tax_core::store::StoreConfig;

use crate::config::CliConfig;

/// Options given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<String>,
    pub db: Option<String>,
    pub tax_year: Option<i32>,
    pub brackets_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Effective settings: command line over config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreConfig,
    pub tax_year: i32,
    pub brackets_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(
        config: CliConfig,
        overrides: Overrides,
    ) -> Self {
        let mut store = config.store;
        if let Some(backend) = overrides.backend {
            store.backend = backend;
        }
        if let Some(db) = overrides.db {
            store.connection_string = db;
        }

        Self {
            store,
            tax_year: overrides
                .tax_year
                .or(config.tax_year)
                .unwrap_or(DEFAULT_TAX_YEAR),
            brackets_file: overrides.brackets_file.or(config.brackets_file),
            log_level: overrides.log_level.or(config.log_level),
            log_file: overrides.log_file.or(config.log_file),
        }
    }

    /// `true` when saved sessions will not outlive this process.
    pub fn is_ephemeral_store(&self) -> bool {
        self.store.backend == "memory" || self.store.connection_string == ":memory:"
    }
}
