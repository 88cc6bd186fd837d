use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DeliveryError, SourceError};
use crate::halachic::HourRecord;
use crate::label::ZmanLabel;
use crate::storage::{CurrentRecord, LabelState, SuppressionRecord};
use crate::time_points::RawTimes;

/// Place the time source computes times for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// GeoNames identifier.
    pub geonameid: u64,
}

/// Supplies one calendar day's named times.
#[async_trait]
pub trait TimeSource: Send + Sync {
    /// Short identifier for logs (e.g. "hebcal", "file").
    fn name(&self) -> &str;

    async fn fetch(&self, date: NaiveDate, location: Location) -> Result<RawTimes, SourceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reminder,
    Summary,
    Startup,
}

/// A message for the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub label: Option<ZmanLabel>,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        label: Option<ZmanLabel>,
        title: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            label,
            title: title.into(),
            message: message.into(),
            created_at,
        }
    }
}

/// Fire-and-forget delivery of notifications. Failures are reported, never
/// retried by the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// Whole-value writes of the derived state.
#[async_trait]
pub trait StateSink: Send + Sync {
    async fn write_label(&self, state: &LabelState) -> Result<(), DeliveryError>;

    async fn write_current(&self, record: &CurrentRecord) -> Result<(), DeliveryError>;

    /// `None` clears the record for a day without a usable daylight span.
    async fn write_hour(&self, record: Option<&HourRecord>) -> Result<(), DeliveryError>;

    async fn write_suppression(&self, record: &SuppressionRecord) -> Result<(), DeliveryError>;
}
