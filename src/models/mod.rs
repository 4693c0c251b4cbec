//! Data models for Skylens
//!
//! - Raw: loosely-shaped backend payload, consumed only by the normalizer
//! - Weather: the strict dashboard model
//! - Codes: condition and weather-code tables
//! - Location: queries and geocoding suggestions

pub mod codes;
pub mod location;
pub mod raw;
pub mod weather;

pub use codes::{ConditionClass, WeatherType, weather_code_for_condition};
pub use location::{LocationSuggestion, WeatherQuery};
pub use raw::RawWeatherPayload;
pub use weather::{DayForecast, HistoricalPoint, HistoryWindow, WeatherModel};
