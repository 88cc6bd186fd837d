//! TOML-based service configuration.
//!
//! Stores:
//! - Time zone, daily refresh time and the next-up fallback label
//! - Time-point source (time-service or local file)
//! - Webhook notification settings
//! - Sabbath lead/trail minutes
//! - Reminder offsets and relevance groups, keyed by label
//!
//! Configuration is stored at `~/.config/zmanim-notify/config.toml`.
//! [`Config`] is the on-disk shape; [`Settings`] is the validated runtime
//! form. Anything `Settings::from_config` rejects is a deployment defect and
//! stops the service at startup.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::integrations::Location;
use crate::label::ZmanLabel;
use crate::plan::OffsetTable;
use crate::sabbath::{SabbathWindow, DEFAULT_LEAD_MINUTES, DEFAULT_TRAIL_MINUTES};
use crate::tracker::RelevanceGroups;

const MAX_OFFSET_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Hebcal,
    File,
}

/// Where the day's time points come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// GeoNames id of the location.
    #[serde(default = "default_geonameid")]
    pub geonameid: u64,
    /// JSON file for `kind = "file"`. `{date}` is replaced by `YYYY-MM-DD`.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Send a notification when the service starts.
    #[serde(default)]
    pub on_startup: bool,
    /// Minutes before sunrise for the day summary; 0 disables it.
    #[serde(default = "default_summary_lead")]
    pub summary_lead_minutes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SabbathConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_lead")]
    pub lead_minutes: i64,
    #[serde(default = "default_trail")]
    pub trail_minutes: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    /// Directory for state files. Defaults to `<data dir>/state`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Service configuration.
///
/// Serialized to/from TOML at `~/.config/zmanim-notify/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Local wall-clock time (`HH:MM`) of the daily refresh.
    #[serde(default = "default_refresh_time")]
    pub refresh_time: String,
    /// Label reported as next-up once every time of the day has passed.
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub sabbath: SabbathConfig,
    #[serde(default)]
    pub state: StateConfig,
    /// Reminder minutes before each label; negative means after.
    #[serde(default = "default_offsets")]
    pub offsets: BTreeMap<String, i64>,
    /// Labels kept relevant while the key label is the anchor.
    #[serde(default = "default_relevance")]
    pub relevance: BTreeMap<String, Vec<String>>,
}

// Default functions
fn default_source_kind() -> SourceKind {
    SourceKind::Hebcal
}
fn default_base_url() -> String {
    "https://www.hebcal.com".into()
}
fn default_geonameid() -> u64 {
    5277142
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_summary_lead() -> u32 {
    60
}
fn default_lead() -> i64 {
    DEFAULT_LEAD_MINUTES
}
fn default_trail() -> i64 {
    DEFAULT_TRAIL_MINUTES
}
fn default_timezone() -> String {
    "America/Chicago".into()
}
fn default_refresh_time() -> String {
    "02:00".into()
}
fn default_fallback_label() -> String {
    ZmanLabel::Tzeit72min.key().into()
}
fn default_offsets() -> BTreeMap<String, i64> {
    let table = OffsetTable::default();
    ZmanLabel::ALL
        .into_iter()
        .filter(|label| table.get(*label) != 0)
        .map(|label| (label.key().to_string(), table.get(label)))
        .collect()
}
fn default_relevance() -> BTreeMap<String, Vec<String>> {
    let groups = RelevanceGroups::default();
    ZmanLabel::ALL
        .into_iter()
        .filter_map(|label| {
            groups.row(label).map(|row| {
                (
                    label.key().to_string(),
                    row.iter().map(|l| l.key().to_string()).collect(),
                )
            })
        })
        .collect()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            base_url: default_base_url(),
            geonameid: default_geonameid(),
            path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            webhook_url: String::new(),
            timeout_secs: default_timeout_secs(),
            on_startup: false,
            summary_lead_minutes: default_summary_lead(),
        }
    }
}

impl Default for SabbathConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_minutes: DEFAULT_LEAD_MINUTES,
            trail_minutes: DEFAULT_TRAIL_MINUTES,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            refresh_time: default_refresh_time(),
            fallback_label: default_fallback_label(),
            source: SourceConfig::default(),
            notifications: NotificationsConfig::default(),
            sabbath: SabbathConfig::default(),
            state: StateConfig::default(),
            offsets: default_offsets(),
            relevance: default_relevance(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(invalid("config key is empty".into()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| invalid("unknown config key".into()))?;
                let existing = obj.get(part);

                let new_value = match existing {
                    Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    Some(serde_json::Value::Number(_)) => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    Some(_) => serde_json::Value::String(value.into()),
                    // Offsets may name labels that have no entry yet.
                    None if key.starts_with("offsets.") => {
                        let n = value
                            .parse::<i64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    None => return Err(invalid("unknown config key".into())),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| invalid("unknown config key".into()))?;
        }

        Err(invalid("unknown config key".into()))
    }

    /// Default config file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        }
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and validate the result.
    ///
    /// The in-memory config is left untouched when the new value does not
    /// produce valid [`Settings`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Settings::from_config(&updated)?;
        *self = updated;
        Ok(())
    }

    /// Directory that holds the state files.
    pub fn state_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.state.dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let dir = data_dir().map_err(|e| ConfigError::InvalidValue {
                    key: "state.dir".into(),
                    message: e.to_string(),
                })?;
                Ok(dir.join("state"))
            }
        }
    }
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timezone: Tz,
    pub refresh_time: NaiveTime,
    pub fallback_label: ZmanLabel,
    pub location: Location,
    pub offsets: OffsetTable,
    pub relevance: RelevanceGroups,
    /// `None` when the Sabbath window is disabled.
    pub sabbath: Option<SabbathWindow>,
    pub summary_lead_minutes: Option<u32>,
    pub notify_on_startup: bool,
    /// Upper bound for every source fetch and sink write.
    pub io_timeout: Duration,
}

impl Settings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "timezone".into(),
                message: format!("{e}"),
            })?;

        let refresh_time = NaiveTime::parse_from_str(&config.refresh_time, "%H:%M").map_err(|e| {
            ConfigError::InvalidValue {
                key: "refresh_time".into(),
                message: format!("expected HH:MM: {e}"),
            }
        })?;

        let fallback_label = parse_label("fallback_label", &config.fallback_label)?;

        let mut offsets = OffsetTable::zero();
        for (key, minutes) in &config.offsets {
            let label = parse_label("offsets", key)?;
            if minutes.abs() > MAX_OFFSET_MINUTES {
                return Err(ConfigError::InvalidValue {
                    key: format!("offsets.{key}"),
                    message: format!("{minutes} minutes is more than a day"),
                });
            }
            offsets.set(label, *minutes);
        }

        let mut relevance = RelevanceGroups::empty();
        for (key, row) in &config.relevance {
            let label = parse_label("relevance", key)?;
            let row = row
                .iter()
                .map(|member| parse_label("relevance", member))
                .collect::<Result<Vec<_>, _>>()?;
            relevance.set_row(label, row);
        }

        let sabbath = if config.sabbath.enabled {
            for (key, minutes) in [
                ("sabbath.lead_minutes", config.sabbath.lead_minutes),
                ("sabbath.trail_minutes", config.sabbath.trail_minutes),
            ] {
                if !(0..=MAX_OFFSET_MINUTES).contains(&minutes) {
                    return Err(ConfigError::InvalidValue {
                        key: key.into(),
                        message: format!("{minutes} is outside 0..={MAX_OFFSET_MINUTES}"),
                    });
                }
            }
            Some(SabbathWindow::new(
                timezone,
                config.sabbath.lead_minutes,
                config.sabbath.trail_minutes,
            ))
        } else {
            None
        };

        let timeout_secs = config.source.timeout_secs.max(config.notifications.timeout_secs);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "source.timeout_secs".into(),
                message: "timeout must be at least one second".into(),
            });
        }

        Ok(Self {
            timezone,
            refresh_time,
            fallback_label,
            location: Location {
                geonameid: config.source.geonameid,
            },
            offsets,
            relevance,
            sabbath,
            summary_lead_minutes: match config.notifications.summary_lead_minutes {
                0 => None,
                lead => Some(lead),
            },
            notify_on_startup: config.notifications.on_startup,
            io_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_label(table: &'static str, key: &str) -> Result<ZmanLabel, ConfigError> {
    key.parse()
        .map_err(|source| ConfigError::UnknownLabel { table, source })
}
