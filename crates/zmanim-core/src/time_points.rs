//! Per-day snapshot of named time points.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::label::ZmanLabel;

/// Raw `label -> ISO-8601 instant` mapping as delivered by a time source.
pub type RawTimes = BTreeMap<String, String>;

/// A label with its instant for the day, if the source supplied one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NamedTime {
    pub label: ZmanLabel,
    pub at: Option<DateTime<Utc>>,
}

/// Immutable set of the day's time points, total over [`ZmanLabel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePointSet {
    date: NaiveDate,
    times: [Option<DateTime<Utc>>; ZmanLabel::COUNT],
}

impl TimePointSet {
    /// Build from a source mapping.
    ///
    /// Keys outside the enumeration are ignored and malformed instants are
    /// dropped for their label only, so this never fails.
    pub fn from_raw(date: NaiveDate, raw: &RawTimes) -> Self {
        let mut times = [None; ZmanLabel::COUNT];
        for (key, value) in raw {
            let label = match key.parse::<ZmanLabel>() {
                Ok(label) => label,
                Err(_) => {
                    debug!(key = %key, "ignoring unrecognised time label");
                    continue;
                }
            };
            match parse_instant(value) {
                Some(at) => times[label.index()] = Some(at),
                None => warn!(label = %label, value = %value, "dropping malformed instant"),
            }
        }
        Self { date, times }
    }

    /// Build from already-typed instants. Labels not listed are absent.
    pub fn from_times<I>(date: NaiveDate, entries: I) -> Self
    where
        I: IntoIterator<Item = (ZmanLabel, DateTime<Utc>)>,
    {
        let mut times = [None; ZmanLabel::COUNT];
        for (label, at) in entries {
            times[label.index()] = Some(at);
        }
        Self { date, times }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn get(&self, label: ZmanLabel) -> Option<DateTime<Utc>> {
        self.times[label.index()]
    }

    /// Every label in canonical order, present or not.
    pub fn iter(&self) -> impl Iterator<Item = NamedTime> + '_ {
        ZmanLabel::ALL.into_iter().map(|label| NamedTime {
            label,
            at: self.get(label),
        })
    }

    /// Present labels in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (ZmanLabel, DateTime<Utc>)> + '_ {
        ZmanLabel::ALL
            .into_iter()
            .filter_map(|label| self.get(label).map(|at| (label, at)))
    }

    pub fn present_count(&self) -> usize {
        self.times.iter().filter(|t| t.is_some()).count()
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
