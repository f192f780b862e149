pub mod app;
pub mod config;
pub mod logging;
pub mod report;
pub mod settings;
pub mod utils;

pub use app::build_registry;
pub use config::{CliConfig, ConfigError};
pub use settings::{Overrides, Settings};
