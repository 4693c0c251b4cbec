//! Normalized dashboard model

use serde::{Deserialize, Serialize};

use super::codes::WeatherType;

/// Years shown per page of the historical chart
pub const HISTORY_PAGE_SIZE: usize = 7;

/// Everything the dashboard renders for one successful search.
///
/// Built fresh by the normalizer on every search and replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherModel {
    pub city: String,
    pub country: String,
    /// IANA zone (or abbreviation) reported by the backend
    pub time_zone: Option<String>,
    /// Temperature in Celsius
    pub temperature: i32,
    pub condition: String,
    /// Relative humidity, 0-100
    pub humidity: u8,
    /// Wind speed in km/h
    pub wind_speed: i32,
    /// Precipitation in mm, as sent
    pub precipitation: f64,
    pub weather_code: u8,
    /// Localized display date, e.g. "Monday, Jun 02"
    pub date: String,
    /// `HH:MM`, 24-hour
    pub sunrise: String,
    /// `HH:MM`, 24-hour
    pub sunset: String,
    /// Up to 24 values in 0-100
    pub rain_chance: Vec<u8>,
    /// Up to 7 days
    pub weekly_forecast: Vec<DayForecast>,
    /// One point per year, ascending
    pub historical_trend: Vec<HistoricalPoint>,
    pub climate_insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayForecast {
    /// "Today" or a three-letter weekday
    pub day: String,
    pub temp: i32,
    pub condition: String,
    pub weather_code: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Four-digit year
    pub year: String,
    /// Mean temperature in Celsius
    pub temperature: f64,
    /// Mean precipitation in mm
    pub rainfall: f64,
}

/// A page of the historical trend, newest page first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow<'a> {
    pub points: &'a [HistoricalPoint],
    /// Page actually shown after clamping
    pub page: usize,
    pub total_pages: usize,
    pub start_year: Option<&'a str>,
    pub end_year: Option<&'a str>,
}

impl HistoryWindow<'_> {
    #[must_use]
    pub fn has_older(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    #[must_use]
    pub fn has_newer(&self) -> bool {
        self.page > 0
    }
}

impl WeatherModel {
    /// Theme classification of the current conditions
    #[must_use]
    pub fn weather_type(&self) -> WeatherType {
        WeatherType::from_code(self.weather_code)
    }

    /// Slice of the historical trend for `page`, where page 0 holds the most
    /// recent years. Pages past the oldest one clamp to it.
    #[must_use]
    pub fn history_page(&self, page: usize) -> HistoryWindow<'_> {
        let total = self.historical_trend.len();
        let total_pages = total.div_ceil(HISTORY_PAGE_SIZE).max(1);
        let page = page.min(total_pages - 1);

        let end = total - page * HISTORY_PAGE_SIZE;
        let start = end.saturating_sub(HISTORY_PAGE_SIZE);
        let points = &self.historical_trend[start..end];

        HistoryWindow {
            points,
            page,
            total_pages,
            start_year: points.first().map(|p| p.year.as_str()),
            end_year: points.last().map(|p| p.year.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_years(years: std::ops::RangeInclusive<u32>) -> WeatherModel {
        WeatherModel {
            city: "Zurich".to_string(),
            country: "Switzerland".to_string(),
            time_zone: Some("Europe/Zurich".to_string()),
            temperature: 18,
            condition: "Light Rain".to_string(),
            humidity: 73,
            wind_speed: 12,
            precipitation: 1.4,
            weather_code: 61,
            date: "Sunday, Jun 01".to_string(),
            sunrise: "05:30".to_string(),
            sunset: "21:15".to_string(),
            rain_chance: vec![14],
            weekly_forecast: Vec::new(),
            historical_trend: years
                .map(|y| HistoricalPoint {
                    year: y.to_string(),
                    temperature: 15.0,
                    rainfall: 2.0,
                })
                .collect(),
            climate_insights: Vec::new(),
        }
    }

    #[test]
    fn test_weather_type() {
        assert_eq!(model_with_years(2020..=2020).weather_type(), WeatherType::Rainy);
    }

    #[test]
    fn test_history_paging_newest_first() {
        let model = model_with_years(2010..=2024); // 15 years, 3 pages

        let newest = model.history_page(0);
        assert_eq!(newest.total_pages, 3);
        assert_eq!(newest.points.len(), 7);
        assert_eq!(newest.start_year, Some("2018"));
        assert_eq!(newest.end_year, Some("2024"));
        assert!(newest.has_older());
        assert!(!newest.has_newer());

        let oldest = model.history_page(2);
        assert_eq!(oldest.points.len(), 1);
        assert_eq!(oldest.start_year, Some("2010"));
        assert!(!oldest.has_older());
        assert!(oldest.has_newer());
    }

    #[test]
    fn test_history_page_clamps() {
        let model = model_with_years(2020..=2023);
        let window = model.history_page(9);
        assert_eq!(window.page, 0);
        assert_eq!(window.points.len(), 4);
    }

    #[test]
    fn test_history_empty() {
        let mut model = model_with_years(2020..=2020);
        model.historical_trend.clear();
        let window = model.history_page(0);
        assert_eq!(window.total_pages, 1);
        assert!(window.points.is_empty());
        assert_eq!(window.start_year, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(model_with_years(2020..=2020)).unwrap();
        assert_eq!(json["weatherCode"], 61);
        assert_eq!(json["windSpeed"], 12);
        assert_eq!(json["timeZone"], "Europe/Zurich");
        assert!(json["historicalTrend"].is_array());
    }
}
