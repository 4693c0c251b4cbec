//! Backend payload as received from `/api/weather/enhanced`
//!
//! Nothing in here is trusted. Every field is optional and deserialized
//! leniently: a value of the wrong shape becomes `None` (or the default
//! record) instead of failing the whole payload. Only the normalizer reads
//! these types.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a field, turning any shape mismatch into `None`
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a sequence, keeping positions: malformed entries become defaults
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Deserialize a list of strings, dropping non-string entries
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Root of the enhanced weather response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWeatherPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<RawCity>,
    #[serde(default, deserialize_with = "lenient")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timezone_abbreviation: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub live_forecast: Vec<RawForecastDay>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub historical_data: Vec<RawHistoricalSample>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunrise: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCity {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
}

/// A date as the backend may send it: a string, or an object carrying `date`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Text(String),
    Structured { date: String },
}

impl RawDate {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            RawDate::Text(s) | RawDate::Structured { date: s } => s,
        }
    }
}

/// Temperature either as a bare number or an `{avg, max, min}` record
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTemperature {
    Scalar(f64),
    Record {
        #[serde(default, deserialize_with = "lenient")]
        avg: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        max: Option<f64>,
        #[serde(default, deserialize_with = "lenient")]
        min: Option<f64>,
    },
}

impl RawTemperature {
    /// Daily mean, falling back to the scalar form
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        match self {
            RawTemperature::Scalar(t) => Some(*t),
            RawTemperature::Record { avg, .. } => *avg,
        }
    }

    /// Daily maximum, falling back to the scalar form
    #[must_use]
    pub fn maximum(&self) -> Option<f64> {
        match self {
            RawTemperature::Scalar(t) => Some(*t),
            RawTemperature::Record { max, .. } => *max,
        }
    }
}

/// One entry of `live_forecast`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawForecastDay {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<RawDate>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<RawTemperature>,
    /// Fraction in [0,1] or percentage in [0,100]
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
    /// Meters per second
    #[serde(default, deserialize_with = "lenient")]
    pub wind_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub precipitation: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunrise: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub sunset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHistoricalTemperature {
    #[serde(default, deserialize_with = "lenient")]
    pub avg: Option<f64>,
}

/// One entry of `historical_data`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHistoricalSample {
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<RawHistoricalTemperature>,
    #[serde(default, deserialize_with = "lenient")]
    pub precipitation: Option<f64>,
}

impl RawWeatherPayload {
    /// Parse a payload from a JSON string
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }
}
