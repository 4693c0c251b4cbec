//! Weather Normalizer
//!
//! Turns a [`RawWeatherPayload`] into the strict [`WeatherModel`]. The
//! transform is total: missing or malformed optional fields fall back to
//! defaults and never produce an error.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use tracing::debug;

use crate::daylight::{self, DEFAULT_SUNRISE, DEFAULT_SUNSET};
use crate::models::raw::{RawForecastDay, RawHistoricalSample, RawWeatherPayload};
use crate::models::{DayForecast, HistoricalPoint, WeatherModel, WeatherQuery, weather_code_for_condition};

/// Forecast days shown in the weekly strip
pub const WEEKLY_DAYS: usize = 7;
/// Entries used for the rain-chance chart
pub const RAIN_CHANCE_SLOTS: usize = 24;

const DEFAULT_CONDITION: &str = "Cloudy";
const DISPLAY_DATE_FORMAT: &str = "%A, %b %d";

static YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("valid date pattern"));
static LEADING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})").expect("valid year pattern"));

/// Formats tried when a date string carries no `YYYY-MM-DD` component
const LOOSE_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Normalize a payload against the wall clock
#[must_use]
pub fn normalize(raw: RawWeatherPayload, query: &WeatherQuery) -> WeatherModel {
    normalize_at(raw, query, Utc::now())
}

/// Normalize a payload, reading "now" from `now`
#[must_use]
pub fn normalize_at(raw: RawWeatherPayload, query: &WeatherQuery, now: DateTime<Utc>) -> WeatherModel {
    let requested = query.date_ymd();
    let index = select_day_index(&raw.live_forecast, requested.as_deref());
    let default_day = RawForecastDay::default();
    let selected = raw.live_forecast.get(index).unwrap_or(&default_day);

    let city = raw.city.clone().unwrap_or_default();
    let city_name = city
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| query.location.clone());
    let country = city.country.unwrap_or_default();
    let time_zone = raw
        .timezone
        .clone()
        .or_else(|| raw.timezone_abbreviation.clone())
        .filter(|tz| !tz.is_empty());

    let temperature = selected
        .temperature
        .as_ref()
        .and_then(|t| t.average())
        .unwrap_or(0.0);
    let condition = selected
        .condition
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CONDITION.to_string());
    let weather_code = weather_code_for_condition(&condition);

    let display_base = requested
        .clone()
        .or_else(|| selected.date.as_ref().and_then(|d| normalize_ymd(d.as_str())));
    let date = display_date(display_base.as_deref(), raw.timezone.as_deref(), now);

    let sunrise = daylight::normalize_clock_time(
        first_non_empty(selected.sunrise.as_deref(), raw.sunrise.as_deref()),
        DEFAULT_SUNRISE,
    );
    let sunset = daylight::normalize_clock_time(
        first_non_empty(selected.sunset.as_deref(), raw.sunset.as_deref()),
        DEFAULT_SUNSET,
    );

    let today = daylight::local_now(raw.timezone.as_deref(), now).date();
    let weekly_forecast = weekly_forecast(&raw.live_forecast, requested.is_some(), today);
    let rain_chance = rain_chance(&raw.live_forecast);
    let historical_trend = aggregate_historical(&raw.historical_data);

    debug!(
        "Normalized {} forecast days (selected {}), {} historical years for '{}'",
        raw.live_forecast.len(),
        index,
        historical_trend.len(),
        city_name
    );

    WeatherModel {
        city: city_name,
        country,
        time_zone,
        temperature: round_to_i32(temperature),
        condition,
        humidity: humidity_percent(selected.humidity.unwrap_or(0.0)),
        wind_speed: wind_kmh(selected.wind_speed.unwrap_or(0.0)),
        precipitation: selected.precipitation.unwrap_or(0.0),
        weather_code,
        date,
        sunrise,
        sunset,
        rain_chance,
        weekly_forecast,
        historical_trend,
        climate_insights: raw.insights,
    }
}

fn first_non_empty<'a>(primary: Option<&'a str>, secondary: Option<&'a str>) -> Option<&'a str> {
    primary
        .filter(|s| !s.is_empty())
        .or_else(|| secondary.filter(|s| !s.is_empty()))
}

/// Nearest integer with halves rounded toward +∞ (`-2.5` → `-2`, `2.5` → `3`)
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round_to_i32(value: f64) -> i32 {
    // `as` saturates on overflow and maps NaN to 0
    round_half_up(value) as i32
}

/// Canonical `YYYY-MM-DD` for a bare date, a datetime, or a loosely formatted date
#[must_use]
pub fn normalize_ymd(raw: &str) -> Option<String> {
    if let Some(m) = YMD.captures(raw).and_then(|caps| caps.get(1)) {
        return Some(m.as_str().to_string());
    }

    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.format("%Y-%m-%d").to_string());
    }
    LOOSE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Index of the forecast day to display.
///
/// The first record whose date matches `requested`; index 0 when nothing is
/// requested or nothing matches.
#[must_use]
pub fn select_day_index(days: &[RawForecastDay], requested: Option<&str>) -> usize {
    let Some(requested) = requested.and_then(normalize_ymd) else {
        return 0;
    };

    days.iter()
        .position(|day| {
            day.date
                .as_ref()
                .and_then(|d| normalize_ymd(d.as_str()))
                .is_some_and(|ymd| ymd == requested)
        })
        .unwrap_or_else(|| {
            debug!("No forecast day matches {}, using first day", requested);
            0
        })
}

/// Relative humidity as 0-100: values ≤ 1 are fractions, larger ones percentages
#[must_use]
pub fn humidity_percent(raw: f64) -> u8 {
    let percent = if raw <= 1.0 { raw * 100.0 } else { raw };
    round_half_up(percent).clamp(0.0, 100.0) as u8
}

/// Meters per second to whole kilometers per hour
#[must_use]
pub fn wind_kmh(meters_per_second: f64) -> i32 {
    round_to_i32(meters_per_second * 3.6)
}

/// Rough rain "probability" from precipitation: ×10, clamped to 0-100.
///
/// A visualization proxy only; the backend sends no real probability.
#[must_use]
pub fn rain_chance_from_precipitation(precipitation: f64) -> u8 {
    round_half_up(precipitation * 10.0).clamp(0.0, 100.0) as u8
}

fn rain_chance(days: &[RawForecastDay]) -> Vec<u8> {
    days.iter()
        .take(RAIN_CHANCE_SLOTS)
        .map(|d| rain_chance_from_precipitation(d.precipitation.unwrap_or(0.0)))
        .collect()
}

fn weekly_forecast(days: &[RawForecastDay], specific_date: bool, today: NaiveDate) -> Vec<DayForecast> {
    days.iter()
        .take(WEEKLY_DAYS)
        .enumerate()
        .map(|(index, day)| {
            let label = if !specific_date && index == 0 {
                "Today".to_string()
            } else {
                let date = day
                    .date
                    .as_ref()
                    .and_then(|d| normalize_ymd(d.as_str()))
                    .and_then(|ymd| NaiveDate::parse_from_str(&ymd, "%Y-%m-%d").ok())
                    .unwrap_or(today);
                date.format("%a").to_string()
            };

            let temp = day
                .temperature
                .as_ref()
                .and_then(|t| t.maximum().or_else(|| t.average()))
                .unwrap_or(0.0);
            let condition = day
                .condition
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONDITION.to_string());

            DayForecast {
                day: label,
                temp: round_to_i32(temp),
                weather_code: weather_code_for_condition(&condition),
                condition,
            }
        })
        .collect()
}

#[derive(Default)]
struct YearAggregate {
    temperature_sum: f64,
    samples: u32,
    rainfall_sum: f64,
}

/// One point per year, ascending.
///
/// Samples without a leading four-digit year are dropped. Rainfall is
/// divided by the number of samples in the year (the same divisor as
/// temperature), so a missing precipitation value counts as 0 mm.
#[must_use]
pub fn aggregate_historical(samples: &[RawHistoricalSample]) -> Vec<HistoricalPoint> {
    let mut years: BTreeMap<String, YearAggregate> = BTreeMap::new();
    let mut dropped = 0usize;

    for sample in samples {
        let year = sample
            .date
            .as_deref()
            .and_then(|d| LEADING_YEAR.captures(d))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        let Some(year) = year else {
            dropped += 1;
            continue;
        };

        let agg = years.entry(year).or_default();
        agg.temperature_sum += sample.temperature.as_ref().and_then(|t| t.avg).unwrap_or(0.0);
        agg.rainfall_sum += sample.precipitation.unwrap_or(0.0);
        agg.samples += 1;
    }

    if dropped > 0 {
        debug!("Dropped {} historical samples without a year", dropped);
    }

    years
        .into_iter()
        .map(|(year, agg)| {
            let count = f64::from(agg.samples.max(1));
            HistoricalPoint {
                year,
                temperature: agg.temperature_sum / count,
                rainfall: agg.rainfall_sum / count,
            }
        })
        .collect()
}

/// `"Monday, Jun 02"` for a calendar date, or for "now" at the location
#[must_use]
pub fn display_date(ymd: Option<&str>, time_zone: Option<&str>, now: DateTime<Utc>) -> String {
    let date = ymd
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| daylight::local_now(time_zone, now).date());
    date.format(DISPLAY_DATE_FORMAT).to_string()
}
