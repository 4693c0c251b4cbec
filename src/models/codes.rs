//! Weather code tables
//!
//! Two independent tables live here and must stay independent:
//! [`ConditionClass`] maps free-text backend conditions to a numeric weather
//! code, and [`WeatherType`] maps a numeric code to a coarse theme. The second
//! accepts codes the first never produces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a free-text condition string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionClass {
    Stormy,
    Rainy,
    Drizzle,
    Snowy,
    Clear,
    Cloudy,
}

impl ConditionClass {
    /// Match keywords case-insensitively; first match in precedence order wins
    #[must_use]
    pub fn from_condition(condition: &str) -> Self {
        let c = condition.to_lowercase();
        if c.contains("thunder") || c.contains("storm") {
            Self::Stormy
        } else if c.contains("rain") {
            Self::Rainy
        } else if c.contains("drizzle") {
            Self::Drizzle
        } else if c.contains("snow") {
            Self::Snowy
        } else if c.contains("clear") || c.contains("sunny") {
            Self::Clear
        } else {
            // "overcast", "cloud" and anything unrecognised
            Self::Cloudy
        }
    }

    /// Numeric weather code for this class
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Stormy => 95,
            Self::Rainy => 61,
            Self::Drizzle => 51,
            Self::Snowy => 71,
            Self::Clear => 1,
            Self::Cloudy => 3,
        }
    }
}

/// Shorthand for `ConditionClass::from_condition(condition).code()`
#[must_use]
pub fn weather_code_for_condition(condition: &str) -> u8 {
    ConditionClass::from_condition(condition).code()
}

/// Coarse theme derived from a weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherType {
    /// Clear night sky (code 0)
    Clear,
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
}

impl WeatherType {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Clear,
            1..=2 => Self::Sunny,
            3 => Self::Cloudy,
            51..=67 | 80..=82 => Self::Rainy,
            71..=77 | 85..=86 => Self::Snowy,
            95..=u8::MAX => Self::Stormy,
            _ => Self::Cloudy,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Stormy => "stormy",
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Clear => "🌙",
            Self::Sunny => "☀️",
            Self::Cloudy => "☁️",
            Self::Rainy => "🌧️",
            Self::Snowy => "❄️",
            Self::Stormy => "⛈️",
        }
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
