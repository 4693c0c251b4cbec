//! Local time and sun cycle
//!
//! Resolves "now" in the searched location's timezone and derives the
//! facts the dashboard needs from it: whether it is night, and how far the
//! sun has travelled between sunrise and sunset.

use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use regex::Regex;
use tracing::debug;

pub const DEFAULT_SUNRISE: &str = "06:00";
pub const DEFAULT_SUNSET: &str = "18:00";

const DEFAULT_SUNRISE_MINUTES: u32 = 6 * 60;
const DEFAULT_SUNSET_MINUTES: u32 = 18 * 60;
/// Daylight span used when sunset is not after sunrise
const FALLBACK_DAYLIGHT_MINUTES: u32 = 12 * 60;

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2}:\d{2})").expect("valid clock time pattern"));
static LEADING_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})").expect("valid leading time pattern"));

/// Extract the first `HH:MM` found in a backend time string.
///
/// Accepts `"06:12"`, `"06:12:30"`, `"2025-10-05T06:12:30Z"` and the like.
#[must_use]
pub fn normalize_clock_time(raw: Option<&str>, fallback: &str) -> String {
    raw.and_then(|t| CLOCK_TIME.captures(t))
        .and_then(|caps| caps.get(1))
        .map_or_else(|| fallback.to_string(), |m| m.as_str().to_string())
}

/// Minutes since midnight for a leading `H:MM`/`HH:MM`, clamped to a valid clock
#[must_use]
pub fn minutes_of_day(time: &str) -> Option<u32> {
    let caps = LEADING_TIME.captures(time)?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    Some(hours.min(23) * 60 + minutes.min(59))
}

/// `"18:30"` → `"6:30 PM"`. Strings without a leading time are returned as-is.
#[must_use]
pub fn format_12_hour(time: &str) -> String {
    let Some(caps) = LEADING_TIME.captures(time) else {
        return time.to_string();
    };
    let hour: u32 = caps[1].parse().map_or(0, |h: u32| h.min(23));
    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{} {period}", &caps[2])
}

/// Parse an IANA timezone name
#[must_use]
pub fn resolve_timezone(name: Option<&str>) -> Option<Tz> {
    let name = name?;
    match name.parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            debug!("Unknown timezone '{}', using local time", name);
            None
        }
    }
}

/// Wall-clock time at the location, falling back to the machine's local zone
#[must_use]
pub fn local_now(time_zone: Option<&str>, now: DateTime<Utc>) -> NaiveDateTime {
    match resolve_timezone(time_zone) {
        Some(tz) => now.with_timezone(&tz).naive_local(),
        None => now.with_timezone(&Local).naive_local(),
    }
}

/// Header label shown before any search, e.g. `"Monday 03:45 PM"`
#[must_use]
pub fn now_label(time_zone: Option<&str>, now: DateTime<Utc>) -> String {
    local_now(time_zone, now).format("%A %I:%M %p").to_string()
}

/// Sunrise and sunset as minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunCycle {
    pub sunrise_minutes: u32,
    pub sunset_minutes: u32,
}

impl SunCycle {
    /// Build from `HH:MM` strings; unparseable values fall back to 06:00/18:00
    #[must_use]
    pub fn from_times(sunrise: &str, sunset: &str) -> Self {
        Self {
            sunrise_minutes: minutes_of_day(sunrise).unwrap_or(DEFAULT_SUNRISE_MINUTES),
            sunset_minutes: minutes_of_day(sunset).unwrap_or(DEFAULT_SUNSET_MINUTES),
        }
    }

    /// Minutes of daylight, never zero
    #[must_use]
    pub fn daylight_span(&self) -> u32 {
        let span = if self.sunset_minutes > self.sunrise_minutes {
            self.sunset_minutes - self.sunrise_minutes
        } else {
            FALLBACK_DAYLIGHT_MINUTES
        };
        span.max(1)
    }

    /// Fraction of daylight elapsed, in [0, 1]
    #[must_use]
    pub fn progress(&self, now_minutes: u32) -> f64 {
        let elapsed = f64::from(now_minutes) - f64::from(self.sunrise_minutes);
        (elapsed / f64::from(self.daylight_span())).clamp(0.0, 1.0)
    }

    /// Hour-granularity night check: before the sunrise hour or from the sunset hour on
    #[must_use]
    pub fn is_night(&self, hour: u32) -> bool {
        hour < self.sunrise_minutes / 60 || hour >= self.sunset_minutes / 60
    }

    /// Progress and night flag for the current instant at the location
    #[must_use]
    pub fn position_at(&self, local: NaiveDateTime) -> SunPosition {
        let now_minutes = local.hour() * 60 + local.minute();
        SunPosition {
            progress: self.progress(now_minutes),
            is_night: self.is_night(local.hour()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub progress: f64,
    pub is_night: bool,
}
