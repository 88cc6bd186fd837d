pub mod config;
pub mod run;
pub mod state;
pub mod today;

use std::path::Path;
use zmanim_core::{Config, ConfigError};

/// Load from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}
