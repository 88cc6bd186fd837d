//! External collaborators: where times come from and where results go.

pub mod file_source;
pub mod hebcal;
pub mod memory;
pub mod traits;
pub mod webhook;

pub use file_source::FileSource;
pub use hebcal::HebcalSource;
pub use traits::{
    Location, Notification, NotificationKind, NotificationSink, StateSink, TimeSource,
};
pub use webhook::{DisabledSink, WebhookSink};

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::{ConfigError, CoreError};
use crate::storage::{Config, SourceKind};

/// Time source selected by `[source]`.
pub fn build_source(config: &Config) -> Result<Arc<dyn TimeSource>, CoreError> {
    let timeout = Duration::from_secs(config.source.timeout_secs);
    match config.source.kind {
        SourceKind::Hebcal => Ok(Arc::new(HebcalSource::new(&config.source.base_url, timeout)?)),
        SourceKind::File => {
            let path = config
                .source
                .path
                .clone()
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: "source.path".into(),
                    message: "required when source.kind = \"file\"".into(),
                })?;
            Ok(Arc::new(FileSource::new(path)))
        }
    }
}

/// Notification sink selected by `[notifications]`.
///
/// An enabled section without a webhook URL logs a warning and falls back to
/// the disabled sink, so the state files are still maintained.
pub fn build_notifier(config: &Config) -> Result<Arc<dyn NotificationSink>, CoreError> {
    let section = &config.notifications;
    if !section.enabled {
        return Ok(Arc::new(DisabledSink));
    }
    if section.webhook_url.trim().is_empty() {
        warn!("notifications enabled but notifications.webhook_url is empty");
        return Ok(Arc::new(DisabledSink));
    }
    let sink = WebhookSink::new(
        section.webhook_url.clone(),
        Duration::from_secs(section.timeout_secs),
    )?;
    Ok(Arc::new(sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_requires_path() {
        let mut config = Config::default();
        config.source.kind = SourceKind::File;
        assert!(matches!(
            build_source(&config),
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));

        config.source.path = Some("/tmp/{date}.json".into());
        assert_eq!(build_source(&config).unwrap().name(), "file");
    }

    #[test]
    fn notifier_falls_back_to_disabled() {
        let config = Config::default();
        assert_eq!(build_notifier(&config).unwrap().name(), "disabled");

        let mut config = Config::default();
        config.notifications.webhook_url = "https://maker.ifttt.com/trigger/x".into();
        assert_eq!(build_notifier(&config).unwrap().name(), "webhook");

        config.notifications.enabled = false;
        assert_eq!(build_notifier(&config).unwrap().name(), "disabled");
    }
}
