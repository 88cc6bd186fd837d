//! In-process implementations of the integration traits.
//!
//! Used by tests that need to control the source or observe what the
//! scheduler did.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{DeliveryError, SourceError};
use crate::halachic::HourRecord;
use crate::integrations::traits::{
    Location, Notification, NotificationSink, StateSink, TimeSource,
};
use crate::label::ZmanLabel;
use crate::storage::{CurrentRecord, LabelState, SuppressionRecord};
use crate::time_points::RawTimes;

/// Returns the same times for any date until replaced. `None` fails.
#[derive(Default)]
pub struct StaticSource {
    times: Mutex<Option<RawTimes>>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(times: RawTimes) -> Self {
        Self {
            times: Mutex::new(Some(times)),
            calls: AtomicUsize::new(0),
        }
    }

    /// A source that fails every fetch.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn set(&self, times: Option<RawTimes>) {
        if let Ok(mut guard) = self.times.lock() {
            *guard = times;
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, _date: NaiveDate, _location: Location) -> Result<RawTimes, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.times
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or_else(|| SourceError::Malformed("no times available".into()))
    }
}

/// Keeps every notification it is given.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records nothing and rejects every notification.
    pub fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(&self, notification: &Notification) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Status { status: 500 });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
struct Written {
    labels: BTreeMap<ZmanLabel, LabelState>,
    label_writes: usize,
    current: Option<CurrentRecord>,
    hour: Option<HourRecord>,
    hour_writes: usize,
    suppressions: Vec<SuppressionRecord>,
}

/// State sink that keeps the latest value of every record in memory.
#[derive(Default)]
pub struct MemoryStateStore {
    written: Mutex<Written>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Written {
        self.written.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn label(&self, label: ZmanLabel) -> Option<LabelState> {
        self.snapshot().labels.get(&label).cloned()
    }

    pub fn labels(&self) -> Vec<LabelState> {
        self.snapshot().labels.into_values().collect()
    }

    /// Total label writes, counting overwrites.
    pub fn label_writes(&self) -> usize {
        self.snapshot().label_writes
    }

    pub fn current(&self) -> Option<CurrentRecord> {
        self.snapshot().current
    }

    pub fn hour(&self) -> Option<HourRecord> {
        self.snapshot().hour
    }

    /// Hour writes, cleared records included.
    pub fn hour_writes(&self) -> usize {
        self.snapshot().hour_writes
    }

    pub fn suppressions(&self) -> Vec<SuppressionRecord> {
        self.snapshot().suppressions
    }
}

#[async_trait]
impl StateSink for MemoryStateStore {
    async fn write_label(&self, state: &LabelState) -> Result<(), DeliveryError> {
        if let Ok(mut w) = self.written.lock() {
            w.labels.insert(state.label, state.clone());
            w.label_writes += 1;
        }
        Ok(())
    }

    async fn write_current(&self, record: &CurrentRecord) -> Result<(), DeliveryError> {
        if let Ok(mut w) = self.written.lock() {
            w.current = Some(record.clone());
        }
        Ok(())
    }

    async fn write_hour(&self, record: Option<&HourRecord>) -> Result<(), DeliveryError> {
        if let Ok(mut w) = self.written.lock() {
            w.hour = record.cloned();
            w.hour_writes += 1;
        }
        Ok(())
    }

    async fn write_suppression(&self, record: &SuppressionRecord) -> Result<(), DeliveryError> {
        if let Ok(mut w) = self.written.lock() {
            w.suppressions.push(record.clone());
        }
        Ok(())
    }
}
