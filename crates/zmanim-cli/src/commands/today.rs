use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use std::path::Path;
use zmanim_core::integrations::build_source;
use zmanim_core::plan::build_plan;
use zmanim_core::tracker::derive;
use zmanim_core::{hour_index, Settings, TimePointSet, TriggerKind, ZmanLabel};

use super::{load_config, runtime};

fn local(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%-I:%M %p").to_string()
}

pub fn run(config_path: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let settings = Settings::from_config(&config)?;
    let source = build_source(&config)?;
    let tz = settings.timezone;
    let now = Utc::now();
    let date = now.with_timezone(&tz).date_naive();

    let raw = runtime()?.block_on(async {
        tokio::time::timeout(settings.io_timeout, source.fetch(date, settings.location)).await
    })??;
    let set = TimePointSet::from_raw(date, &raw);

    let mut plan = build_plan(&set, &settings.offsets, settings.summary_lead_minutes);
    plan.sort_by_key(|t| t.at);
    let derived = derive(&set, now, settings.fallback_label, &settings.relevance);
    let hour = match (set.get(ZmanLabel::Sunrise), set.get(ZmanLabel::Sunset)) {
        (Some(sunrise), Some(sunset)) => Some(hour_index(sunrise, sunset, now)?),
        _ => None,
    };
    let sabbath = settings
        .sabbath
        .zip(set.get(ZmanLabel::Sunset))
        .map(|(window, sunset)| window.interval(sunset));

    if json {
        let times: serde_json::Map<String, serde_json::Value> = set
            .iter()
            .map(|t| {
                let value = t.at.map(|at| at.with_timezone(&tz).to_rfc3339());
                (t.label.key().to_string(), json!(value))
            })
            .collect();
        let triggers: Vec<_> = plan
            .iter()
            .map(|t| {
                json!({
                    "label": t.label,
                    "kind": t.kind,
                    "at": t.at.with_timezone(&tz).to_rfc3339(),
                    "past": t.at <= now,
                })
            })
            .collect();
        let out = json!({
            "date": date,
            "timezone": tz.name(),
            "times": times,
            "triggers": triggers,
            "next_up": derived.next_up,
            "last_passed": derived.last_passed,
            "hour": hour,
            "sabbath": sabbath.map(|s| json!({
                "start": s.start.with_timezone(&tz).to_rfc3339(),
                "end": s.end.with_timezone(&tz).to_rfc3339(),
                "active": s.contains(now),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Zmanim for {} ({})", date.format("%A, %B %-d"), tz.name());
    for entry in set.iter() {
        let at = entry.at.map(|at| local(at, tz)).unwrap_or_else(|| "--".into());
        println!("  {:<20} {:>8}", entry.label.display_name(), at);
    }

    println!();
    println!("Notifications:");
    for trigger in plan.iter().filter(|t| t.kind != TriggerKind::Exact) {
        let marker = if trigger.at <= now { " (past)" } else { "" };
        let what = match trigger.kind {
            TriggerKind::Summary => "day summary".to_string(),
            _ => format!("{}m before {}", trigger.offset_minutes, trigger.label.display_name()),
        };
        println!("  {:>8}  {what}{marker}", local(trigger.at, tz));
    }

    println!();
    if let Some(next) = derived.next_up {
        let suffix = if next.fallback { " (day complete)" } else { "" };
        println!("Next up: {} {}{suffix}", next.label.display_name(), local(next.at, tz));
    }
    if let Some(hour) = hour {
        println!("Halachic hour: {hour}");
    }
    if let Some(window) = sabbath {
        let state = if window.contains(now) { " (in effect)" } else { "" };
        println!(
            "Sabbath window: {} - {}{state}",
            window.start.with_timezone(&tz).format("%a %-I:%M %p"),
            window.end.with_timezone(&tz).format("%a %-I:%M %p"),
        );
    }
    Ok(())
}
