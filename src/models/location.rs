//! Search inputs: the weather query and location suggestions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SkylensError;

/// A weather lookup as issued by the user. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherQuery {
    /// Free-text place name, already shaped for the backend
    pub location: String,
    /// Requested calendar day; `None` means "today"
    pub date: Option<NaiveDate>,
}

impl WeatherQuery {
    /// Build a query from user input.
    ///
    /// The location is trimmed and cut at the first comma so that a picked
    /// suggestion label (`"Paris, Île-de-France, France"`) searches for the
    /// place name alone. The date, when given, must be `YYYY-MM-DD`.
    pub fn new(location: &str, date: Option<&str>) -> Result<Self, SkylensError> {
        let location = location.split(',').next().unwrap_or_default().trim();
        if location.is_empty() {
            return Err(SkylensError::validation("Location cannot be empty"));
        }

        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                SkylensError::validation(format!("Date must be YYYY-MM-DD, got: {raw}"))
            })?),
            None => None,
        };

        Ok(Self {
            location: location.to_string(),
            date,
        })
    }

    /// Requested date as `YYYY-MM-DD`
    #[must_use]
    pub fn date_ymd(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// A geocoding match offered while the user types
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    pub name: String,
    pub country: String,
    /// First-level administrative area (state, canton, region)
    pub admin1: String,
}

impl LocationSuggestion {
    /// `"name, admin1, country"` with empty parts left out
    #[must_use]
    pub fn label(&self) -> String {
        [&self.name, &self.admin1, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
