//! HTTP client for the weather backend and the geocoding service
//!
//! [`WeatherBackend`] is the seam the coordinator and the suggestion lookup
//! talk to; [`WeatherApiClient`] is the production implementation, built on
//! reqwest with transient-failure retry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::SkylensConfig;
use crate::error::{ErrorCode, SkylensError};
use crate::models::{LocationSuggestion, RawWeatherPayload, WeatherQuery};

/// Source of raw weather payloads and location suggestions
#[async_trait]
pub trait WeatherBackend: Send + Sync {
    /// Fetch the aggregated weather payload for a query
    async fn fetch_weather(&self, query: &WeatherQuery) -> Result<RawWeatherPayload, SkylensError>;

    /// Look up places matching partially typed text
    async fn suggest_locations(&self, text: &str) -> Result<Vec<LocationSuggestion>, SkylensError>;
}

/// Geocoding response
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: Option<String>,
    country: Option<String>,
    admin1: Option<String>,
}

impl From<GeocodingResult> for LocationSuggestion {
    fn from(result: GeocodingResult) -> Self {
        LocationSuggestion {
            name: result.name.unwrap_or_default(),
            country: result.country.unwrap_or_default(),
            admin1: result.admin1.unwrap_or_default(),
        }
    }
}

/// Client for the weather backend and the geocoding API
pub struct WeatherApiClient {
    client: ClientWithMiddleware,
    config: SkylensConfig,
}

impl WeatherApiClient {
    /// Create a new client
    pub fn new(config: SkylensConfig) -> Result<Self, SkylensError> {
        let timeout = Duration::from_secs(config.backend.timeout_seconds.into());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("Skylens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SkylensError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.backend.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    /// `GET {base}/api/weather/enhanced?city=..&days=..[&date=..]`
    #[must_use]
    pub fn weather_url(&self, query: &WeatherQuery) -> String {
        let mut url = format!(
            "{}/api/weather/enhanced?city={}&days={}",
            self.config.backend.base_url.trim_end_matches('/'),
            urlencoding::encode(&query.location),
            self.config.backend.forecast_days
        );
        if let Some(date) = query.date_ymd() {
            url.push_str("&date=");
            url.push_str(&date);
        }
        url
    }

    /// `GET {geocoding}/search?name=..&count=..&language=..&format=json`
    #[must_use]
    pub fn suggestion_url(&self, text: &str) -> String {
        format!(
            "{}/search?name={}&count={}&language={}&format=json",
            self.config.geocoding.base_url.trim_end_matches('/'),
            urlencoding::encode(text.trim()),
            self.config.geocoding.count,
            urlencoding::encode(&self.config.geocoding.language)
        )
    }

    async fn get_body(&self, url: &str) -> Result<String, SkylensError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error: {}", e);
            SkylensError::api(format!("Network error: {e}"), ErrorCode::ApiNetworkError)
        })?;

        let status = response.status();
        debug!("HTTP response received: {}", status);
        if !status.is_success() {
            warn!("Backend returned {}", status);
            return Err(SkylensError::api_status(
                format!(
                    "Backend error {} - {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown error")
                ),
                status.as_u16(),
            ));
        }

        response.text().await.map_err(|e| {
            warn!("Failed to read response body: {}", e);
            SkylensError::api(format!("Network error: {e}"), ErrorCode::ApiNetworkError)
        })
    }
}

/// Parse a geocoding body into suggestions
fn parse_suggestions(body: &str) -> Result<Vec<LocationSuggestion>, SkylensError> {
    let response: GeocodingResponse = serde_json::from_str(body).map_err(|e| {
        SkylensError::api(
            format!("Invalid geocoding data: {e}"),
            ErrorCode::ApiInvalidResponse,
        )
    })?;
    Ok(response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(LocationSuggestion::from)
        .collect())
}

#[async_trait]
impl WeatherBackend for WeatherApiClient {
    #[instrument(skip(self, query), fields(location = %query.location, date = ?query.date))]
    async fn fetch_weather(&self, query: &WeatherQuery) -> Result<RawWeatherPayload, SkylensError> {
        let url = self.weather_url(query);
        debug!("Weather backend request URL: {}", url);
        let start_time = Instant::now();

        let body = self.get_body(&url).await?;
        let payload = RawWeatherPayload::from_json(&body).map_err(|e| {
            error!("Failed to parse weather payload: {}", e);
            SkylensError::api(
                "Invalid weather data received from backend",
                ErrorCode::ApiInvalidResponse,
            )
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Retrieved weather for '{}' ({} forecast days) in {:.3}s",
            query.location,
            payload.live_forecast.len(),
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!("Slow backend response: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(payload)
    }

    #[instrument(skip(self))]
    async fn suggest_locations(&self, text: &str) -> Result<Vec<LocationSuggestion>, SkylensError> {
        let url = self.suggestion_url(text);
        let body = self.get_body(&url).await?;
        let suggestions = parse_suggestions(&body)?;
        debug!("{} suggestions for '{}'", suggestions.len(), text);
        Ok(suggestions)
    }
}
