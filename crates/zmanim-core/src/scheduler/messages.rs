//! Notification text.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::integrations::{Notification, NotificationKind};
use crate::label::ZmanLabel;
use crate::time_points::TimePointSet;

fn clock(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%-I:%M %p").to_string()
}

fn minutes(n: i64) -> String {
    if n == 1 {
        "1 minute".to_string()
    } else {
        format!("{n} minutes")
    }
}

/// "Time remaining" message for a reminder `offset_minutes` before `at`.
/// Negative offsets read as time elapsed.
pub fn reminder(
    label: ZmanLabel,
    offset_minutes: i64,
    at: DateTime<Utc>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Notification {
    let name = label.display_name();
    let span = minutes(offset_minutes.abs());
    let (title, message) = if offset_minutes >= 0 {
        (
            format!("{name} in {span}"),
            format!("{span} until {name} ({})", clock(at, tz)),
        )
    } else {
        (
            format!("{name} was {span} ago"),
            format!("{span} since {name} ({})", clock(at, tz)),
        )
    };
    Notification::new(NotificationKind::Reminder, Some(label), title, message, now)
}

/// One line per present label.
pub fn day_listing(set: &TimePointSet, tz: Tz) -> String {
    set.present()
        .map(|(label, at)| format!("{}: {}", label.display_name(), clock(at, tz)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn summary(set: &TimePointSet, tz: Tz, now: DateTime<Utc>) -> Notification {
    Notification::new(
        NotificationKind::Summary,
        None,
        format!("Zmanim for {}", set.date().format("%A, %B %-d")),
        day_listing(set, tz),
        now,
    )
}

pub fn startup(set: Option<&TimePointSet>, armed: usize, tz: Tz, now: DateTime<Utc>) -> Notification {
    let message = match set {
        Some(set) => format!("{armed} notifications scheduled\n{}", day_listing(set, tz)),
        None => "No times available yet".to_string(),
    };
    Notification::new(
        NotificationKind::Startup,
        None,
        "Zmanim notifier started",
        message,
        now,
    )
}
