//! Optional TOML config file supplying defaults for command-line options.
//!
//! ```toml
//! tax_year = 2568
//! brackets_file = "brackets.csv"
//! log_level = "info"
//!
//! [store]
//! backend = "sqlite"
//! connection_string = "sessions.db"
//! ```
//!
//! Every key is optional. Options given on the command line win.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tax_core::store::StoreConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub store: StoreConfig,
    pub tax_year: Option<i32>,
    /// Bracket CSV replacing the built-in table.
    pub brackets_file: Option<PathBuf>,
    /// EnvFilter directive, e.g. `"debug"` or `"warn,tax_core=debug"`.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_toml_str(
        input: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
