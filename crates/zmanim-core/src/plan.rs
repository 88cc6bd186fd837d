//! Event plan: turns the day's time points into triggers.
//!
//! A present label yields an `exact` trigger at its instant and, when its
//! offset is non-zero, a `reminder` trigger `offset` minutes before it
//! (after it, for negative offsets). The plan does not look at "now"; the
//! scheduler decides which triggers are still worth arming.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::label::ZmanLabel;
use crate::time_points::TimePointSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Reminder,
    Exact,
    /// Day overview sent once before sunrise.
    Summary,
}

/// One scheduled unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub label: ZmanLabel,
    pub at: DateTime<Utc>,
    pub kind: TriggerKind,
    /// Minutes between `at` and the label's instant. Zero for exact triggers.
    pub offset_minutes: i64,
}

/// Signed reminder offsets in minutes, one per label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    minutes: [i64; ZmanLabel::COUNT],
}

impl OffsetTable {
    /// Every label at zero: exact triggers only.
    pub fn zero() -> Self {
        Self {
            minutes: [0; ZmanLabel::COUNT],
        }
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ZmanLabel, i64)>,
    {
        let mut table = Self::zero();
        for (label, minutes) in entries {
            table.minutes[label.index()] = minutes;
        }
        table
    }

    pub fn get(&self, label: ZmanLabel) -> i64 {
        self.minutes[label.index()]
    }

    pub fn set(&mut self, label: ZmanLabel, minutes: i64) {
        self.minutes[label.index()] = minutes;
    }
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self::from_entries([
            (ZmanLabel::Sunrise, 30),
            (ZmanLabel::SofZmanShma, 30),
            (ZmanLabel::SofZmanTfilla, 30),
            (ZmanLabel::MinchaGedola, 25),
            (ZmanLabel::MinchaKetana, 30),
            (ZmanLabel::Sunset, 30),
            (ZmanLabel::Tzeit85deg, 30),
        ])
    }
}

/// Reminder and exact triggers for every present label.
pub fn build_triggers(set: &TimePointSet, offsets: &OffsetTable) -> Vec<Trigger> {
    let mut triggers = Vec::with_capacity(set.present_count() * 2);
    for (label, at) in set.present() {
        let offset = offsets.get(label);
        if offset != 0 {
            triggers.push(Trigger {
                label,
                at: at - Duration::minutes(offset),
                kind: TriggerKind::Reminder,
                offset_minutes: offset,
            });
        }
        triggers.push(Trigger {
            label,
            at,
            kind: TriggerKind::Exact,
            offset_minutes: 0,
        });
    }
    triggers
}

/// Full day plan: [`build_triggers`] plus the optional pre-sunrise summary.
pub fn build_plan(
    set: &TimePointSet,
    offsets: &OffsetTable,
    summary_lead_minutes: Option<u32>,
) -> Vec<Trigger> {
    let mut triggers = build_triggers(set, offsets);
    if let (Some(lead), Some(sunrise)) = (summary_lead_minutes, set.get(ZmanLabel::Sunrise)) {
        let lead = i64::from(lead);
        triggers.push(Trigger {
            label: ZmanLabel::Sunrise,
            at: sunrise - Duration::minutes(lead),
            kind: TriggerKind::Summary,
            offset_minutes: lead,
        });
    }
    triggers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, h, m, 0).unwrap()
    }

    fn day() -> TimePointSet {
        TimePointSet::from_times(
            NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            [
                (ZmanLabel::Sunrise, at(6, 0)),
                (ZmanLabel::Chatzot, at(12, 0)),
                (ZmanLabel::Sunset, at(18, 0)),
            ],
        )
    }

    fn of_kind(triggers: &[Trigger], kind: TriggerKind) -> Vec<(ZmanLabel, DateTime<Utc>)> {
        let mut found: Vec<_> = triggers
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| (t.label, t.at))
            .collect();
        found.sort_by_key(|(_, at)| *at);
        found
    }

    #[test]
    fn reminders_precede_their_exact_triggers() {
        let offsets = OffsetTable::from_entries([(ZmanLabel::Sunrise, 30), (ZmanLabel::Sunset, 60)]);
        let triggers = build_triggers(&day(), &offsets);

        assert_eq!(
            of_kind(&triggers, TriggerKind::Reminder),
            vec![(ZmanLabel::Sunrise, at(5, 30)), (ZmanLabel::Sunset, at(17, 0))]
        );
        assert_eq!(
            of_kind(&triggers, TriggerKind::Exact),
            vec![
                (ZmanLabel::Sunrise, at(6, 0)),
                (ZmanLabel::Chatzot, at(12, 0)),
                (ZmanLabel::Sunset, at(18, 0)),
            ]
        );
    }

    #[test]
    fn zero_offset_emits_exact_only() {
        let triggers = build_triggers(&day(), &OffsetTable::zero());
        assert_eq!(triggers.len(), 3);
        assert!(triggers.iter().all(|t| t.kind == TriggerKind::Exact));
        assert!(triggers.iter().all(|t| t.offset_minutes == 0));
    }

    #[test]
    fn negative_offset_fires_after_the_instant() {
        let offsets = OffsetTable::from_entries([(ZmanLabel::Chatzot, -15)]);
        let triggers = build_triggers(&day(), &offsets);
        let reminder = triggers
            .iter()
            .find(|t| t.kind == TriggerKind::Reminder)
            .unwrap();
        assert_eq!(reminder.at, at(12, 15));
        assert_eq!(reminder.offset_minutes, -15);
    }

    #[test]
    fn absent_labels_produce_nothing() {
        let offsets = OffsetTable::from_entries([(ZmanLabel::Tzeit72min, 30)]);
        let triggers = build_triggers(&day(), &offsets);
        assert!(triggers.iter().all(|t| t.label != ZmanLabel::Tzeit72min));
    }

    #[test]
    fn plan_adds_summary_before_sunrise() {
        let plan = build_plan(&day(), &OffsetTable::zero(), Some(60));
        assert_eq!(
            of_kind(&plan, TriggerKind::Summary),
            vec![(ZmanLabel::Sunrise, at(5, 0))]
        );

        let without = build_plan(&day(), &OffsetTable::zero(), None);
        assert!(of_kind(&without, TriggerKind::Summary).is_empty());
    }

    #[test]
    fn default_offsets_match_reminder_table() {
        let offsets = OffsetTable::default();
        assert_eq!(offsets.get(ZmanLabel::MinchaGedola), 25);
        assert_eq!(offsets.get(ZmanLabel::Sunset), 30);
        assert_eq!(offsets.get(ZmanLabel::Chatzot), 0);
    }
}
