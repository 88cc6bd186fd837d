//! State tracking: what has passed, what is next, and what is still relevant.
//!
//! Everything here is a pure function of the day's [`TimePointSet`], the
//! configured tables and "now". Derived state is recomputed on every fire and
//! never patched incrementally.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::label::ZmanLabel;
use crate::time_points::TimePointSet;

/// A label with the instant it occurs today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub label: ZmanLabel,
    pub at: DateTime<Utc>,
}

/// The upcoming label. `fallback` is set when nothing remains today and the
/// configured fallback label was used instead; its instant is then not in
/// the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NextUp {
    pub label: ZmanLabel,
    pub at: DateTime<Utc>,
    pub fallback: bool,
}

/// Which labels each label keeps relevant while it is the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceGroups {
    rows: BTreeMap<ZmanLabel, BTreeSet<ZmanLabel>>,
}

impl RelevanceGroups {
    pub fn empty() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = (ZmanLabel, R)>,
        R: IntoIterator<Item = ZmanLabel>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|(label, row)| (label, row.into_iter().collect()))
                .collect(),
        }
    }

    pub fn row(&self, label: ZmanLabel) -> Option<&BTreeSet<ZmanLabel>> {
        self.rows.get(&label)
    }

    pub fn set_row(&mut self, label: ZmanLabel, row: impl IntoIterator<Item = ZmanLabel>) {
        self.rows.insert(label, row.into_iter().collect());
    }
}

impl Default for RelevanceGroups {
    fn default() -> Self {
        use ZmanLabel::*;
        Self::from_rows([
            (ChatzotNight, vec![ChatzotNight]),
            (Misheyakir, vec![Misheyakir, SofZmanShma, SofZmanTfilla]),
            (Dawn, vec![Dawn, SofZmanShma, SofZmanTfilla]),
            (Sunrise, vec![Sunrise, SofZmanShma, SofZmanTfilla]),
            (SofZmanShma, vec![SofZmanShma, SofZmanTfilla]),
            (SofZmanTfilla, vec![SofZmanTfilla, Chatzot]),
            (Chatzot, vec![Chatzot, MinchaGedola]),
            (MinchaGedola, vec![MinchaGedola, PlagHaMincha, Sunset]),
            (MinchaKetana, vec![MinchaKetana, PlagHaMincha, Sunset]),
            (PlagHaMincha, vec![PlagHaMincha, Sunset]),
            (Sunset, vec![Sunset, Tzeit85deg]),
            (BeinHaShmashos, vec![BeinHaShmashos, Tzeit85deg]),
            (Tzeit85deg, vec![Tzeit85deg, Tzeit72min]),
            (Tzeit72min, vec![Tzeit72min]),
        ])
    }
}

/// Relevance flags for every present label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relevance {
    pub flags: BTreeMap<ZmanLabel, bool>,
    /// The anchor had no row; every flag is false.
    pub missing_row: bool,
}

/// Output of [`derive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedState {
    pub now: DateTime<Utc>,
    pub next_up: Option<NextUp>,
    pub last_passed: Option<Marker>,
    /// Label whose relevance row was applied.
    pub anchor: Option<ZmanLabel>,
    pub relevance: Relevance,
}

impl DerivedState {
    pub fn is_relevant(&self, label: ZmanLabel) -> bool {
        self.relevance.flags.get(&label).copied().unwrap_or(false)
    }
}

/// Earliest present instant strictly after `now`.
///
/// Ties go to the earlier label in canonical order. With nothing left today
/// the `fallback` label's own instant is returned, flagged as such.
pub fn next_up(set: &TimePointSet, now: DateTime<Utc>, fallback: ZmanLabel) -> Option<NextUp> {
    let upcoming = set
        .present()
        .filter(|(_, at)| *at > now)
        .min_by_key(|(_, at)| *at);

    match upcoming {
        Some((label, at)) => Some(NextUp {
            label,
            at,
            fallback: false,
        }),
        None => set.get(fallback).map(|at| NextUp {
            label: fallback,
            at,
            fallback: true,
        }),
    }
}

/// Latest present instant at or before `now`; ties go to the later label.
pub fn last_passed(set: &TimePointSet, now: DateTime<Utc>) -> Option<Marker> {
    set.present()
        .filter(|(_, at)| *at <= now)
        .max_by_key(|(_, at)| *at)
        .map(|(label, at)| Marker { label, at })
}

pub fn relevance(set: &TimePointSet, anchor: ZmanLabel, groups: &RelevanceGroups) -> Relevance {
    let row = groups.row(anchor);
    let flags = set
        .present()
        .map(|(label, _)| (label, row.is_some_and(|r| r.contains(&label))))
        .collect();
    Relevance {
        flags,
        missing_row: row.is_none(),
    }
}

pub fn derive(
    set: &TimePointSet,
    now: DateTime<Utc>,
    fallback: ZmanLabel,
    groups: &RelevanceGroups,
) -> DerivedState {
    let next = next_up(set, now, fallback);
    let last = last_passed(set, now);
    let anchor = last.map(|m| m.label).or(next.map(|n| n.label));
    let relevance = match anchor {
        Some(anchor) => relevance(set, anchor, groups),
        None => Relevance {
            flags: BTreeMap::new(),
            missing_row: false,
        },
    };
    DerivedState {
        now,
        next_up: next,
        last_passed: last,
        anchor,
        relevance,
    }
}
