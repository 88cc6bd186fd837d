mod config;
pub mod records;
pub mod state_store;

pub use config::{
    Config, NotificationsConfig, SabbathConfig, Settings, SourceConfig, SourceKind, StateConfig,
};
pub use records::{CurrentRecord, LabelState, StateSnapshot, SuppressionRecord};
pub use state_store::FileStateStore;

use std::path::PathBuf;

/// Returns `~/.config/zmanim-notify[-dev]/` based on ZMANIM_ENV.
///
/// Set ZMANIM_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ZMANIM_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("zmanim-notify-dev")
    } else {
        base_dir.join("zmanim-notify")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
