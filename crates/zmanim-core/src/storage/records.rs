//! Shapes of the persisted state files.
//!
//! Instants are stored in the configured local zone with their UTC offset so
//! readers can show them without knowing the zone.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::halachic::HourRecord;
use crate::label::ZmanLabel;
use crate::plan::TriggerKind;
use crate::sabbath::SabbathInterval;
use crate::time_points::TimePointSet;
use crate::tracker::DerivedState;

const CLOCK_FORMAT: &str = "%-I:%M %p";

fn local(at: DateTime<Utc>, tz: Tz) -> DateTime<FixedOffset> {
    at.with_timezone(&tz).fixed_offset()
}

/// One `<label>.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelState {
    pub label: ZmanLabel,
    pub relevant: bool,
    /// `None` when the label is absent today.
    pub at: Option<DateTime<FixedOffset>>,
    pub display: String,
}

impl LabelState {
    pub fn new(label: ZmanLabel, at: Option<DateTime<Utc>>, relevant: bool, tz: Tz) -> Self {
        let at = at.map(|at| local(at, tz));
        let display = match at {
            Some(at) => format!("{} {}", label.display_name(), at.format(CLOCK_FORMAT)),
            None => format!("{} not listed today", label.display_name()),
        };
        Self {
            label,
            relevant,
            at,
            display,
        }
    }
}

/// `current.json`: where the day stands right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRecord {
    pub date: NaiveDate,
    /// Label whose relevance row is in force.
    pub anchor: Option<ZmanLabel>,
    pub last_passed: Option<ZmanLabel>,
    pub next_up: Option<ZmanLabel>,
    pub next_up_at: Option<DateTime<FixedOffset>>,
    /// `next_up` is the configured fallback, not a future time.
    pub next_up_fallback: bool,
    pub display: String,
    pub computed_at: DateTime<FixedOffset>,
}

/// `suppressed.json`: the last fire swallowed by the Sabbath window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionRecord {
    pub label: Option<ZmanLabel>,
    pub kind: Option<TriggerKind>,
    pub window_start: DateTime<FixedOffset>,
    pub window_end: DateTime<FixedOffset>,
    pub suppressed_at: DateTime<FixedOffset>,
}

impl SuppressionRecord {
    pub fn new(
        label: Option<ZmanLabel>,
        kind: Option<TriggerKind>,
        window: SabbathInterval,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        Self {
            label,
            kind,
            window_start: local(window.start, tz),
            window_end: local(window.end, tz),
            suppressed_at: local(now, tz),
        }
    }
}

/// Everything written after an exact fire, a refresh or the startup pass.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// One entry per label in canonical order, absent labels included.
    pub labels: Vec<LabelState>,
    pub current: CurrentRecord,
    /// `None` when sunrise or sunset is missing today.
    pub hour: Option<HourRecord>,
}

impl StateSnapshot {
    pub fn build(
        set: &TimePointSet,
        derived: &DerivedState,
        tz: Tz,
        hour: Option<HourRecord>,
    ) -> Self {
        let labels = set
            .iter()
            .map(|t| LabelState::new(t.label, t.at, derived.is_relevant(t.label), tz))
            .collect();

        let next_up_at = derived.next_up.map(|n| local(n.at, tz));
        let display = match (derived.next_up, next_up_at) {
            (Some(next), Some(at)) if !next.fallback => {
                format!("Next: {} {}", next.label.display_name(), at.format(CLOCK_FORMAT))
            }
            (Some(next), Some(at)) => format!(
                "Day complete (last: {} {})",
                next.label.display_name(),
                at.format(CLOCK_FORMAT)
            ),
            _ => "No times available".to_string(),
        };

        let current = CurrentRecord {
            date: set.date(),
            anchor: derived.anchor,
            last_passed: derived.last_passed.map(|m| m.label),
            next_up: derived.next_up.map(|n| n.label),
            next_up_at,
            next_up_fallback: derived.next_up.is_some_and(|n| n.fallback),
            display,
            computed_at: local(derived.now, tz),
        };

        Self {
            labels,
            current,
            hour,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{derive, RelevanceGroups};
    use chrono::TimeZone;
    use chrono_tz::America::Chicago;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, h, m, 0).unwrap()
    }

    fn day() -> TimePointSet {
        TimePointSet::from_times(
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            [
                (ZmanLabel::Sunrise, at(12, 2)),
                (ZmanLabel::SofZmanShma, at(15, 0)),
                (ZmanLabel::Chatzot, at(17, 46)),
            ],
        )
    }

    #[test]
    fn label_display_uses_local_clock() {
        let state = LabelState::new(ZmanLabel::Sunrise, Some(at(12, 2)), true, Chicago);
        assert_eq!(state.display, "Sunrise 7:02 AM");
        assert_eq!(state.at.unwrap().offset().local_minus_utc(), -5 * 3600);

        let absent = LabelState::new(ZmanLabel::Dawn, None, false, Chicago);
        assert_eq!(absent.display, "Dawn not listed today");
    }

    #[test]
    fn snapshot_covers_every_label() {
        let set = day();
        let derived = derive(&set, at(14, 0), ZmanLabel::Tzeit72min, &RelevanceGroups::default());
        let snapshot = StateSnapshot::build(&set, &derived, Chicago, None);

        assert_eq!(snapshot.labels.len(), ZmanLabel::COUNT);
        let shma = &snapshot.labels[ZmanLabel::SofZmanShma.index()];
        assert!(shma.relevant);
        assert!(!snapshot.labels[ZmanLabel::Chatzot.index()].relevant);

        assert_eq!(snapshot.current.anchor, Some(ZmanLabel::Sunrise));
        assert_eq!(snapshot.current.next_up, Some(ZmanLabel::SofZmanShma));
        assert_eq!(snapshot.current.display, "Next: Latest Shema 10:00 AM");
        assert!(!snapshot.current.next_up_fallback);
    }

    #[test]
    fn empty_day_has_placeholder_display() {
        let set = TimePointSet::from_times(NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(), []);
        let derived = derive(&set, at(14, 0), ZmanLabel::Tzeit72min, &RelevanceGroups::default());
        let snapshot = StateSnapshot::build(&set, &derived, Chicago, None);
        assert_eq!(snapshot.current.display, "No times available");
        assert!(snapshot.labels.iter().all(|l| !l.relevant && l.at.is_none()));
    }
}
