//! Weekly quiet period.
//!
//! The interval runs from Friday at the given sunset's local wall-clock time
//! minus the lead, to Saturday at the same wall-clock time plus the trail.
//! "That week" is the Sunday-to-Saturday week containing the sunset's local
//! date. Callers pass the current day's sunset; nothing is cached.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

pub const DEFAULT_LEAD_MINUTES: i64 = 18;
pub const DEFAULT_TRAIL_MINUTES: i64 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SabbathInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SabbathInterval {
    /// Closed at both ends.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SabbathWindow {
    tz: Tz,
    lead: Duration,
    trail: Duration,
}

impl SabbathWindow {
    pub fn new(tz: Tz, lead_minutes: i64, trail_minutes: i64) -> Self {
        Self {
            tz,
            lead: Duration::minutes(lead_minutes),
            trail: Duration::minutes(trail_minutes),
        }
    }

    pub fn with_defaults(tz: Tz) -> Self {
        Self::new(tz, DEFAULT_LEAD_MINUTES, DEFAULT_TRAIL_MINUTES)
    }

    pub fn interval(&self, sunset: DateTime<Utc>) -> SabbathInterval {
        let local = sunset.with_timezone(&self.tz);
        let date = local.date_naive();
        let time = local.time();
        let sunday = date - Days::new(u64::from(date.weekday().num_days_from_sunday()));
        let friday = sunday + Days::new(5);
        let saturday = sunday + Days::new(6);
        let fixed = local.offset().fix();

        SabbathInterval {
            start: self.resolve(friday, time, fixed.local_minus_utc()) - self.lead,
            end: self.resolve(saturday, time, fixed.local_minus_utc()) + self.trail,
        }
    }

    /// Whether `instant` falls in the interval derived from `sunset`.
    pub fn contains(&self, sunset: DateTime<Utc>, instant: DateTime<Utc>) -> bool {
        self.interval(sunset).contains(instant)
    }

    /// Local wall-clock time on `date` as an instant. Inside a DST gap the
    /// sunset's own UTC offset is applied.
    fn resolve(&self, date: NaiveDate, time: NaiveTime, fallback_offset_secs: i32) -> DateTime<Utc> {
        let naive = date.and_time(time);
        match self.tz.from_local_datetime(&naive).earliest() {
            Some(dt) => dt.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&(naive - Duration::seconds(i64::from(fallback_offset_secs)))),
        }
    }
}
