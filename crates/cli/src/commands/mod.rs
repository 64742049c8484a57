pub mod check;
pub mod doctor;
pub mod history;
pub mod run;

use minion_config::{AppConfig, ConfigError};
use std::path::Path;

/// `--config PATH` if given, else `~/.minion/config.toml`; env overrides applied.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
}
