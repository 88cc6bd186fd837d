use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::label::ZmanLabel;
use crate::plan::TriggerKind;

/// Every state change in the scheduler produces an Event.
/// The actor logs them; callers and tests inspect them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new day's time points were loaded and triggers armed.
    Refreshed {
        date: NaiveDate,
        generation: u64,
        present: usize,
        scheduled: usize,
        skipped_past: usize,
        at: DateTime<Utc>,
    },
    /// The source failed; the previous set (if any) stays in effect.
    RefreshFailed {
        date: NaiveDate,
        message: String,
        kept_previous: bool,
        at: DateTime<Utc>,
    },
    /// One timer was armed for the current generation.
    TriggerScheduled {
        label: ZmanLabel,
        kind: TriggerKind,
        fire_at: DateTime<Utc>,
        generation: u64,
    },
    ReminderSent {
        label: ZmanLabel,
        offset_minutes: i64,
        at: DateTime<Utc>,
    },
    SummarySent {
        date: NaiveDate,
        at: DateTime<Utc>,
    },
    StartupNotified {
        at: DateTime<Utc>,
    },
    /// Derived state was recomputed and written.
    StatePersisted {
        anchor: Option<ZmanLabel>,
        next_up: Option<ZmanLabel>,
        hour: Option<i64>,
        at: DateTime<Utc>,
    },
    /// Fire landed inside the Sabbath window; nothing was sent.
    /// `label` and `kind` are empty for the startup pass.
    Suppressed {
        label: Option<ZmanLabel>,
        kind: Option<TriggerKind>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Timer from a superseded refresh fired and was ignored.
    StaleTriggerDropped {
        label: ZmanLabel,
        kind: TriggerKind,
        generation: u64,
        current_generation: u64,
        at: DateTime<Utc>,
    },
    ConfigurationError {
        message: String,
        at: DateTime<Utc>,
    },
    DeliveryFailed {
        sink: String,
        message: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Emit this event through `tracing` at a level matching its severity.
    pub fn log(&self) {
        match self {
            Event::Refreshed {
                date,
                generation,
                present,
                scheduled,
                skipped_past,
                ..
            } => info!(
                %date,
                generation,
                present,
                scheduled,
                skipped_past,
                "times refreshed"
            ),
            Event::RefreshFailed {
                date,
                message,
                kept_previous,
                ..
            } => warn!(%date, kept_previous, "refresh failed: {message}"),
            Event::TriggerScheduled {
                label,
                kind,
                fire_at,
                generation,
            } => info!(%label, ?kind, %fire_at, generation, "trigger scheduled"),
            Event::ReminderSent {
                label,
                offset_minutes,
                ..
            } => info!(%label, offset_minutes, "reminder sent"),
            Event::SummarySent { date, .. } => info!(%date, "summary sent"),
            Event::StartupNotified { .. } => info!("startup notification sent"),
            Event::StatePersisted {
                anchor,
                next_up,
                hour,
                ..
            } => info!(?anchor, ?next_up, ?hour, "state persisted"),
            Event::Suppressed {
                label,
                kind,
                window_start,
                window_end,
                ..
            } => info!(
                ?label,
                ?kind,
                %window_start,
                %window_end,
                "suppressed inside Sabbath window"
            ),
            Event::StaleTriggerDropped {
                label,
                generation,
                current_generation,
                ..
            } => debug!(%label, generation, current_generation, "stale trigger dropped"),
            Event::ConfigurationError { message, .. } => error!("configuration error: {message}"),
            Event::DeliveryFailed { sink, message, .. } => {
                warn!(sink = %sink, "delivery failed: {message}")
            }
        }
    }
}
