//! Scheduling decisions without the actor plumbing.
//!
//! [`Orchestrator`] owns the day's [`TimePointSet`], the generation counter
//! and the sinks. Every method takes the current instant from the clock and
//! returns the [`Event`]s it produced; the actor decides what to do with
//! timers and logging.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::clock::Clock;
use super::messages;
use crate::error::{ClockError, DeliveryError, SourceError};
use crate::events::Event;
use crate::halachic::{self, HourRecord};
use crate::integrations::{Notification, NotificationSink, StateSink, TimeSource};
use crate::label::ZmanLabel;
use crate::plan::{build_plan, Trigger, TriggerKind};
use crate::sabbath::SabbathInterval;
use crate::storage::{Settings, StateSnapshot, SuppressionRecord};
use crate::time_points::TimePointSet;
use crate::tracker;

/// Result of one refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub generation: u64,
    /// The source answered; `false` when the previous set was kept.
    pub fetched: bool,
    /// Triggers still in the future, in firing order.
    pub armed: Vec<Trigger>,
    pub events: Vec<Event>,
}

pub struct Orchestrator {
    settings: Settings,
    source: Arc<dyn TimeSource>,
    notifier: Arc<dyn NotificationSink>,
    state: Arc<dyn StateSink>,
    clock: Arc<dyn Clock>,
    current: Option<TimePointSet>,
    generation: u64,
    armed: usize,
}

async fn bounded<T, E, F>(timeout: Duration, fut: F, on_timeout: E) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout),
    }
}

impl Orchestrator {
    pub fn new(
        settings: Settings,
        source: Arc<dyn TimeSource>,
        notifier: Arc<dyn NotificationSink>,
        state: Arc<dyn StateSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            source,
            notifier,
            state,
            clock,
            current: None,
            generation: 0,
            armed: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn current(&self) -> Option<&TimePointSet> {
        self.current.as_ref()
    }

    fn timeout_secs(&self) -> u64 {
        self.settings.io_timeout.as_secs()
    }

    /// Fetch today's times and rebuild the plan.
    ///
    /// The generation always advances, so timers armed before this call
    /// become stale. On a source failure the previous set stays in effect
    /// and only its still-future triggers are armed again.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let now = self.clock.now();
        let date = now.with_timezone(&self.settings.timezone).date_naive();
        let mut events = Vec::new();

        let fetched = bounded(
            self.settings.io_timeout,
            self.source.fetch(date, self.settings.location),
            SourceError::Timeout {
                timeout_secs: self.timeout_secs(),
            },
        )
        .await;

        let fetched = match fetched {
            Ok(raw) => {
                self.current = Some(TimePointSet::from_raw(date, &raw));
                true
            }
            Err(err) => {
                events.push(Event::RefreshFailed {
                    date,
                    message: err.to_string(),
                    kept_previous: self.current.is_some(),
                    at: now,
                });
                false
            }
        };

        self.generation += 1;
        let generation = self.generation;

        let Some(set) = &self.current else {
            self.armed = 0;
            return RefreshOutcome {
                generation,
                fetched,
                armed: Vec::new(),
                events,
            };
        };

        let plan = build_plan(set, &self.settings.offsets, self.settings.summary_lead_minutes);
        let total = plan.len();
        let mut armed: Vec<Trigger> = plan.into_iter().filter(|t| t.at > now).collect();
        armed.sort_by_key(|t| t.at);

        events.extend(armed.iter().map(|t| Event::TriggerScheduled {
            label: t.label,
            kind: t.kind,
            fire_at: t.at,
            generation,
        }));
        events.push(Event::Refreshed {
            date: set.date(),
            generation,
            present: set.present_count(),
            scheduled: armed.len(),
            skipped_past: total - armed.len(),
            at: now,
        });

        self.armed = armed.len();
        RefreshOutcome {
            generation,
            fetched,
            armed,
            events,
        }
    }

    /// Zero or negative daylight in the current set.
    pub fn check_daylight(&self) -> Result<(), ClockError> {
        if let Some(set) = &self.current {
            if let (Some(sunrise), Some(sunset)) =
                (set.get(ZmanLabel::Sunrise), set.get(ZmanLabel::Sunset))
            {
                halachic::hour_length_minutes(sunrise, sunset)?;
            }
        }
        Ok(())
    }

    /// This week's Sabbath interval, if `now` is inside it.
    fn suppression_window(&self, now: DateTime<Utc>) -> Option<SabbathInterval> {
        let window = self.settings.sabbath?;
        let sunset = match self.current.as_ref().and_then(|s| s.get(ZmanLabel::Sunset)) {
            Some(sunset) => sunset,
            None => {
                warn!("no sunset today; Sabbath window not applied");
                return None;
            }
        };
        let interval = window.interval(sunset);
        interval.contains(now).then_some(interval)
    }

    async fn suppress(
        &self,
        label: Option<ZmanLabel>,
        kind: Option<TriggerKind>,
        interval: SabbathInterval,
        now: DateTime<Utc>,
    ) -> Vec<Event> {
        let record = SuppressionRecord::new(label, kind, interval, now, self.settings.timezone);
        let mut events = vec![Event::Suppressed {
            label,
            kind,
            window_start: interval.start,
            window_end: interval.end,
            at: now,
        }];
        let write = bounded(
            self.settings.io_timeout,
            self.state.write_suppression(&record),
            DeliveryError::Timeout {
                timeout_secs: self.timeout_secs(),
            },
        )
        .await;
        if let Err(err) = write {
            events.push(self.delivery_failed("state", &err, now));
        }
        events
    }

    fn delivery_failed(&self, sink: &str, err: &DeliveryError, now: DateTime<Utc>) -> Event {
        Event::DeliveryFailed {
            sink: sink.to_string(),
            message: err.to_string(),
            at: now,
        }
    }

    async fn send(&self, notification: &Notification) -> Result<(), DeliveryError> {
        bounded(
            self.settings.io_timeout,
            self.notifier.notify(notification),
            DeliveryError::Timeout {
                timeout_secs: self.timeout_secs(),
            },
        )
        .await
    }

    /// Handle one timer.
    pub async fn fire(&mut self, generation: u64, trigger: &Trigger) -> Vec<Event> {
        let now = self.clock.now();
        if generation != self.generation {
            return vec![Event::StaleTriggerDropped {
                label: trigger.label,
                kind: trigger.kind,
                generation,
                current_generation: self.generation,
                at: now,
            }];
        }

        if let Some(interval) = self.suppression_window(now) {
            return self
                .suppress(Some(trigger.label), Some(trigger.kind), interval, now)
                .await;
        }

        let tz = self.settings.timezone;
        match trigger.kind {
            TriggerKind::Reminder => {
                let at = trigger.at + chrono::Duration::minutes(trigger.offset_minutes);
                let notification =
                    messages::reminder(trigger.label, trigger.offset_minutes, at, tz, now);
                match self.send(&notification).await {
                    Ok(()) => vec![Event::ReminderSent {
                        label: trigger.label,
                        offset_minutes: trigger.offset_minutes,
                        at: now,
                    }],
                    Err(err) => vec![self.delivery_failed(self.notifier.name(), &err, now)],
                }
            }
            TriggerKind::Summary => {
                let Some(set) = &self.current else {
                    return Vec::new();
                };
                let date = set.date();
                let notification = messages::summary(set, tz, now);
                match self.send(&notification).await {
                    Ok(()) => vec![Event::SummarySent { date, at: now }],
                    Err(err) => vec![self.delivery_failed(self.notifier.name(), &err, now)],
                }
            }
            TriggerKind::Exact => self.sync_state(now).await,
        }
    }

    /// Recompute derived state and write the full snapshot.
    pub async fn sync_state(&self, now: DateTime<Utc>) -> Vec<Event> {
        let Some(set) = &self.current else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let settings = &self.settings;

        let derived = tracker::derive(set, now, settings.fallback_label, &settings.relevance);
        if derived.relevance.missing_row {
            if let Some(anchor) = derived.anchor {
                events.push(Event::ConfigurationError {
                    message: format!("no relevance row for '{anchor}'"),
                    at: now,
                });
            }
        }

        let hour = match (set.get(ZmanLabel::Sunrise), set.get(ZmanLabel::Sunset)) {
            (Some(sunrise), Some(sunset)) => match HourRecord::compute(sunrise, sunset, now) {
                Ok(record) => Some(record),
                Err(err) => {
                    events.push(Event::ConfigurationError {
                        message: err.to_string(),
                        at: now,
                    });
                    None
                }
            },
            _ => None,
        };

        let snapshot = StateSnapshot::build(set, &derived, settings.timezone, hour);
        let mut failures = Vec::new();
        for label in &snapshot.labels {
            failures.push(self.write(self.state.write_label(label)).await);
        }
        failures.push(self.write(self.state.write_current(&snapshot.current)).await);
        failures.push(self.write(self.state.write_hour(snapshot.hour.as_ref())).await);
        events.extend(
            failures
                .into_iter()
                .filter_map(Result::err)
                .map(|err| self.delivery_failed("state", &err, now)),
        );

        events.push(Event::StatePersisted {
            anchor: derived.anchor,
            next_up: derived.next_up.map(|n| n.label),
            hour: snapshot.hour.map(|h| h.hour),
            at: now,
        });
        events
    }

    async fn write<F>(&self, fut: F) -> Result<(), DeliveryError>
    where
        F: Future<Output = Result<(), DeliveryError>>,
    {
        bounded(
            self.settings.io_timeout,
            fut,
            DeliveryError::Timeout {
                timeout_secs: self.timeout_secs(),
            },
        )
        .await
    }

    /// Persist the current snapshot under the same Sabbath check as a live
    /// fire. Runs after every successful refresh.
    pub async fn state_pass(&self) -> Vec<Event> {
        let now = self.clock.now();
        match self.suppression_window(now) {
            Some(interval) => self.suppress(None, None, interval, now).await,
            None => self.sync_state(now).await,
        }
    }

    /// [`state_pass`](Self::state_pass) plus the optional startup
    /// notification.
    pub async fn startup_pass(&self) -> Vec<Event> {
        let now = self.clock.now();
        if let Some(interval) = self.suppression_window(now) {
            return self.suppress(None, None, interval, now).await;
        }

        let mut events = self.sync_state(now).await;
        if self.settings.notify_on_startup {
            let notification =
                messages::startup(self.current.as_ref(), self.armed, self.settings.timezone, now);
            match self.send(&notification).await {
                Ok(()) => events.push(Event::StartupNotified { at: now }),
                Err(err) => events.push(self.delivery_failed(self.notifier.name(), &err, now)),
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::memory::{MemoryStateStore, RecordingNotifier, StaticSource};
    use crate::integrations::NotificationKind;
    use crate::plan::OffsetTable;
    use crate::scheduler::clock::FixedClock;
    use crate::storage::Config;
    use crate::time_points::RawTimes;
    use crate::tracker::RelevanceGroups;
    use chrono::TimeZone;

    struct Harness {
        orchestrator: Orchestrator,
        source: Arc<StaticSource>,
        notifier: Arc<RecordingNotifier>,
        state: Arc<MemoryStateStore>,
        clock: Arc<FixedClock>,
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn raw(entries: &[(&str, &str)]) -> RawTimes {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Wednesday 2026-10-14 in Chicago (CDT, UTC-5).
    fn wednesday() -> RawTimes {
        raw(&[
            ("sunrise", "2026-10-14T06:00:00-05:00"),
            ("chatzot", "2026-10-14T12:00:00-05:00"),
            ("sunset", "2026-10-14T18:00:00-05:00"),
        ])
    }

    /// Friday 2026-10-16, sunset 18:20 CDT.
    fn friday() -> RawTimes {
        raw(&[
            ("sunrise", "2026-10-16T07:12:00-05:00"),
            ("chatzot", "2026-10-16T12:46:00-05:00"),
            ("sunset", "2026-10-16T18:20:00-05:00"),
        ])
    }

    fn settings() -> Settings {
        let mut settings = Settings::from_config(&Config::default()).unwrap();
        settings.offsets = OffsetTable::from_entries([(ZmanLabel::Sunrise, 30), (ZmanLabel::Sunset, 60)]);
        settings.summary_lead_minutes = None;
        settings
    }

    fn harness(settings: Settings, times: RawTimes, now: DateTime<Utc>) -> Harness {
        let source = Arc::new(StaticSource::new(times));
        let notifier = Arc::new(RecordingNotifier::new());
        let state = Arc::new(MemoryStateStore::new());
        let clock = Arc::new(FixedClock::new(now));
        let orchestrator = Orchestrator::new(
            settings,
            source.clone(),
            notifier.clone(),
            state.clone(),
            clock.clone(),
        );
        Harness {
            orchestrator,
            source,
            notifier,
            state,
            clock,
        }
    }

    #[tokio::test]
    async fn mid_morning_refresh_arms_only_future_triggers() {
        // 11:00 CDT
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        let outcome = h.orchestrator.refresh().await;

        let armed: Vec<_> = outcome.armed.iter().map(|t| (t.label, t.kind, t.at)).collect();
        assert_eq!(
            armed,
            vec![
                (ZmanLabel::Chatzot, TriggerKind::Exact, utc(2026, 10, 14, 17, 0)),
                (ZmanLabel::Sunset, TriggerKind::Reminder, utc(2026, 10, 14, 22, 0)),
                (ZmanLabel::Sunset, TriggerKind::Exact, utc(2026, 10, 14, 23, 0)),
            ]
        );
        assert!(outcome.events.contains(&Event::Refreshed {
            date: chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            generation: 1,
            present: 3,
            scheduled: 3,
            skipped_past: 2,
            at: utc(2026, 10, 14, 16, 0),
        }));
    }

    #[tokio::test]
    async fn mid_morning_state_matches_day() {
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        h.orchestrator.refresh().await;
        h.orchestrator.sync_state(utc(2026, 10, 14, 16, 0)).await;

        let current = h.state.current().unwrap();
        assert_eq!(current.next_up, Some(ZmanLabel::Chatzot));
        assert_eq!(current.last_passed, Some(ZmanLabel::Sunrise));
        assert_eq!(h.state.hour().unwrap().hour, 5);
        assert_eq!(h.state.labels().len(), ZmanLabel::COUNT);
        assert!(h.state.label(ZmanLabel::Sunrise).unwrap().relevant);
        assert!(!h.state.label(ZmanLabel::Sunset).unwrap().relevant);
    }

    #[tokio::test]
    async fn reminder_fire_sends_time_remaining() {
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        let outcome = h.orchestrator.refresh().await;
        let reminder = outcome
            .armed
            .iter()
            .find(|t| t.kind == TriggerKind::Reminder)
            .unwrap()
            .clone();

        h.clock.set(reminder.at);
        let events = h.orchestrator.fire(outcome.generation, &reminder).await;

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::Reminder);
        assert_eq!(sent[0].message, "60 minutes until Sunset (6:00 PM)");
        assert!(matches!(events[..], [Event::ReminderSent { label: ZmanLabel::Sunset, offset_minutes: 60, .. }]));
        assert_eq!(h.state.label_writes(), 0);
    }

    #[tokio::test]
    async fn exact_fire_persists_snapshot() {
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        let outcome = h.orchestrator.refresh().await;
        let chatzot = outcome.armed[0].clone();

        h.clock.set(chatzot.at);
        let events = h.orchestrator.fire(outcome.generation, &chatzot).await;

        assert!(h.notifier.sent().is_empty());
        assert_eq!(h.state.current().unwrap().last_passed, Some(ZmanLabel::Chatzot));
        assert!(events.iter().any(|e| matches!(e, Event::StatePersisted { anchor: Some(ZmanLabel::Chatzot), .. })));
    }

    #[tokio::test]
    async fn stale_generation_is_dropped() {
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        let first = h.orchestrator.refresh().await;
        let second = h.orchestrator.refresh().await;
        assert_eq!(second.generation, first.generation + 1);

        let trigger = first.armed[1].clone();
        h.clock.set(trigger.at);
        let events = h.orchestrator.fire(first.generation, &trigger).await;

        assert!(matches!(events[..], [Event::StaleTriggerDropped { generation: 1, current_generation: 2, .. }]));
        assert!(h.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn fire_at_sabbath_lead_boundary_is_suppressed() {
        let mut settings = settings();
        settings.offsets = OffsetTable::from_entries([(ZmanLabel::Sunset, 18)]);
        // Friday 14:00 CDT
        let mut h = harness(settings, friday(), utc(2026, 10, 16, 19, 0));
        let outcome = h.orchestrator.refresh().await;
        let reminder = outcome
            .armed
            .iter()
            .find(|t| t.kind == TriggerKind::Reminder)
            .unwrap()
            .clone();
        assert_eq!(reminder.at, utc(2026, 10, 16, 23, 2));

        h.clock.set(reminder.at);
        let events = h.orchestrator.fire(outcome.generation, &reminder).await;

        assert!(h.notifier.sent().is_empty());
        assert_eq!(h.state.label_writes(), 0);
        let suppressions = h.state.suppressions();
        assert_eq!(suppressions.len(), 1);
        assert_eq!(suppressions[0].label, Some(ZmanLabel::Sunset));
        assert_eq!(suppressions[0].kind, Some(TriggerKind::Reminder));
        assert!(matches!(events[..], [Event::Suppressed { .. }]));
    }

    #[tokio::test]
    async fn fire_one_minute_before_window_is_delivered() {
        let mut settings = settings();
        settings.offsets = OffsetTable::from_entries([(ZmanLabel::Sunset, 19)]);
        let mut h = harness(settings, friday(), utc(2026, 10, 16, 19, 0));
        let outcome = h.orchestrator.refresh().await;
        let reminder = outcome
            .armed
            .iter()
            .find(|t| t.kind == TriggerKind::Reminder)
            .unwrap()
            .clone();

        h.clock.set(reminder.at);
        h.orchestrator.fire(outcome.generation, &reminder).await;
        assert_eq!(h.notifier.sent().len(), 1);
        assert!(h.state.suppressions().is_empty());
    }

    #[tokio::test]
    async fn disabled_window_never_suppresses() {
        let mut settings = settings();
        settings.sabbath = None;
        let mut h = harness(settings, friday(), utc(2026, 10, 16, 19, 0));
        let outcome = h.orchestrator.refresh().await;
        let sunset = outcome.armed.last().unwrap().clone();
        h.clock.set(sunset.at);
        h.orchestrator.fire(outcome.generation, &sunset).await;
        assert!(h.state.suppressions().is_empty());
        assert!(h.state.current().is_some());
    }

    #[tokio::test]
    async fn source_failure_keeps_previous_set() {
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        h.orchestrator.refresh().await;
        h.source.set(None);

        let outcome = h.orchestrator.refresh().await;
        assert_eq!(h.source.calls(), 2);
        assert!(outcome.events.iter().any(|e| matches!(e, Event::RefreshFailed { kept_previous: true, .. })));
        assert_eq!(outcome.armed.len(), 3);
        assert!(h.orchestrator.current().is_some());
    }

    #[tokio::test]
    async fn first_refresh_failure_schedules_nothing() {
        let state = Arc::new(MemoryStateStore::new());
        let mut orchestrator = Orchestrator::new(
            settings(),
            Arc::new(StaticSource::failing()),
            Arc::new(RecordingNotifier::new()),
            state.clone(),
            Arc::new(FixedClock::new(utc(2026, 10, 14, 16, 0))),
        );
        let outcome = orchestrator.refresh().await;
        assert!(!outcome.fetched);
        assert!(outcome.armed.is_empty());
        assert!(outcome.events.iter().any(|e| matches!(e, Event::RefreshFailed { kept_previous: false, .. })));
        assert!(orchestrator.startup_pass().await.is_empty());
        assert!(orchestrator.state_pass().await.is_empty());
        assert!(state.current().is_none());
    }

    #[tokio::test]
    async fn next_day_without_sunset_clears_hour_record() {
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 14, 16, 0));
        h.orchestrator.refresh().await;
        h.orchestrator.startup_pass().await;
        assert_eq!(h.state.hour().unwrap().hour, 5);

        // Thursday 02:00 CDT, the source only lists sunrise.
        h.clock.set(utc(2026, 10, 15, 7, 0));
        h.source.set(Some(raw(&[("sunrise", "2026-10-15T06:01:00-05:00")])));
        let outcome = h.orchestrator.refresh().await;
        assert!(outcome.fetched);
        h.orchestrator.state_pass().await;

        let current = h.state.current().unwrap();
        assert_eq!(current.date, chrono::NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(current.next_up, Some(ZmanLabel::Sunrise));
        assert!(h.state.hour().is_none());
        assert_eq!(h.state.hour_writes(), 2);
        assert_eq!(h.state.label(ZmanLabel::Sunset).unwrap().at, None);
    }

    #[tokio::test]
    async fn state_pass_inside_window_writes_only_suppression() {
        // Saturday 02:00 CDT.
        let saturday = raw(&[
            ("sunrise", "2026-10-17T07:13:00-05:00"),
            ("sunset", "2026-10-17T18:19:00-05:00"),
        ]);
        let mut h = harness(settings(), saturday, utc(2026, 10, 17, 7, 0));
        h.orchestrator.refresh().await;
        let events = h.orchestrator.state_pass().await;

        assert!(matches!(events[..], [Event::Suppressed { label: None, kind: None, .. }]));
        assert!(h.state.current().is_none());
        assert_eq!(h.state.hour_writes(), 0);
    }

    #[tokio::test]
    async fn summary_trigger_sends_day_listing() {
        let mut settings = settings();
        settings.summary_lead_minutes = Some(60);
        // 04:00 CDT
        let mut h = harness(settings, wednesday(), utc(2026, 10, 14, 9, 0));
        let outcome = h.orchestrator.refresh().await;
        let summary = outcome.armed[0].clone();
        assert_eq!(summary.kind, TriggerKind::Summary);
        assert_eq!(summary.at, utc(2026, 10, 14, 10, 0));

        h.clock.set(summary.at);
        h.orchestrator.fire(outcome.generation, &summary).await;
        let sent = h.notifier.sent();
        assert_eq!(sent[0].kind, NotificationKind::Summary);
        assert!(sent[0].message.starts_with("Sunrise: 6:00 AM"));
    }

    #[tokio::test]
    async fn delivery_failure_is_reported_not_raised() {
        let source = Arc::new(StaticSource::new(wednesday()));
        let state = Arc::new(MemoryStateStore::new());
        let clock = Arc::new(FixedClock::new(utc(2026, 10, 14, 16, 0)));
        let mut orchestrator = Orchestrator::new(
            settings(),
            source,
            Arc::new(RecordingNotifier::rejecting()),
            state,
            clock.clone(),
        );
        let outcome = orchestrator.refresh().await;
        let reminder = outcome
            .armed
            .iter()
            .find(|t| t.kind == TriggerKind::Reminder)
            .unwrap()
            .clone();
        clock.set(reminder.at);
        let events = orchestrator.fire(outcome.generation, &reminder).await;
        assert!(matches!(events[..], [Event::DeliveryFailed { .. }]));
    }

    #[tokio::test]
    async fn startup_pass_inside_window_is_suppressed() {
        // Saturday 2026-10-17 10:00 CDT, Friday-derived window in force.
        let saturday = raw(&[
            ("sunrise", "2026-10-17T07:13:00-05:00"),
            ("sunset", "2026-10-17T18:19:00-05:00"),
        ]);
        let mut h = harness(settings(), saturday, utc(2026, 10, 17, 15, 0));
        h.orchestrator.refresh().await;
        let events = h.orchestrator.startup_pass().await;

        assert!(matches!(events[..], [Event::Suppressed { label: None, kind: None, .. }]));
        assert_eq!(h.state.suppressions().len(), 1);
        assert!(h.state.current().is_none());
    }

    #[tokio::test]
    async fn startup_notification_is_optional() {
        let mut settings = settings();
        settings.notify_on_startup = true;
        let mut h = harness(settings, wednesday(), utc(2026, 10, 14, 16, 0));
        h.orchestrator.refresh().await;
        let events = h.orchestrator.startup_pass().await;
        assert!(events.iter().any(|e| matches!(e, Event::StartupNotified { .. })));
        let sent = h.notifier.sent();
        assert_eq!(sent[0].kind, NotificationKind::Startup);
        assert!(sent[0].message.starts_with("3 notifications scheduled"));
    }

    #[tokio::test]
    async fn missing_relevance_row_is_a_configuration_event() {
        let mut settings = settings();
        settings.relevance = RelevanceGroups::from_rows([(ZmanLabel::Sunset, vec![ZmanLabel::Sunset])]);
        let mut h = harness(settings, wednesday(), utc(2026, 10, 14, 16, 0));
        h.orchestrator.refresh().await;
        let events = h.orchestrator.sync_state(h.clock.now()).await;

        assert!(events.iter().any(|e| matches!(e, Event::ConfigurationError { .. })));
        assert!(h.state.labels().iter().all(|l| !l.relevant));
    }

    #[tokio::test]
    async fn degenerate_daylight_is_detected() {
        let flat = raw(&[
            ("sunrise", "2026-10-14T06:00:00-05:00"),
            ("sunset", "2026-10-14T06:00:00-05:00"),
        ]);
        let mut h = harness(settings(), flat, utc(2026, 10, 14, 16, 0));
        h.orchestrator.refresh().await;
        assert!(h.orchestrator.check_daylight().is_err());

        let events = h.orchestrator.sync_state(h.clock.now()).await;
        assert!(events.iter().any(|e| matches!(e, Event::ConfigurationError { .. })));
        assert!(h.state.hour().is_none());
        assert_eq!(h.state.hour_writes(), 1);
    }

    #[tokio::test]
    async fn refresh_uses_local_calendar_date() {
        // 2026-10-15 03:00 UTC is still the evening of the 14th in Chicago.
        let mut h = harness(settings(), wednesday(), utc(2026, 10, 15, 3, 0));
        h.orchestrator.refresh().await;
        assert_eq!(
            h.orchestrator.current().unwrap().date(),
            chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
        );
    }
}
