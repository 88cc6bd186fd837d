//! Proportional daylight hours.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// 1-based index of the halachic hour containing `now`.
///
/// One hour is a twelfth of `sunset - sunrise`. The result is the ceiling of
/// elapsed hours, with sunrise itself counted as hour 1. It is not clamped:
/// values `<= 0` mean before sunrise and `> 12` after sunset.
pub fn hour_index(
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<i64, ClockError> {
    let daylight_ms = (sunset - sunrise).num_milliseconds();
    if daylight_ms <= 0 {
        return Err(ClockError::DegenerateDaylight { sunrise, sunset });
    }
    // hour = daylight / 12, so elapsed / hour = elapsed * 12 / daylight.
    let scaled = i128::from((now - sunrise).num_milliseconds()) * 12;
    let daylight = i128::from(daylight_ms);
    if scaled == 0 {
        return Ok(1);
    }
    let ceil = -((-scaled).div_euclid(daylight));
    Ok(ceil as i64)
}

/// Length of one halachic hour in minutes, for display.
pub fn hour_length_minutes(sunrise: DateTime<Utc>, sunset: DateTime<Utc>) -> Result<f64, ClockError> {
    let daylight_ms = (sunset - sunrise).num_milliseconds();
    if daylight_ms <= 0 {
        return Err(ClockError::DegenerateDaylight { sunrise, sunset });
    }
    Ok(daylight_ms as f64 / 12.0 / 60_000.0)
}

/// Persisted halachic hour record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourRecord {
    pub hour: i64,
    pub hour_length_minutes: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub computed_at: DateTime<Utc>,
}

impl HourRecord {
    pub fn compute(
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            hour: hour_index(sunrise, sunset, now)?,
            hour_length_minutes: hour_length_minutes(sunrise, sunset)?,
            sunrise,
            sunset,
            computed_at: now,
        })
    }

    pub fn is_daylight(&self) -> bool {
        (1..=12).contains(&self.hour)
    }
}
