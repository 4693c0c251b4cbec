//! Configuration management for `Skylens`
//!
//! Handles loading configuration from files and environment variables
//! and provides validation for all configuration settings.

use crate::SkylensError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides the weather backend base URL
pub const API_BASE_ENV: &str = "SKYLENS_API_BASE";

/// Root configuration structure for `Skylens`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkylensConfig {
    /// Weather backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Location suggestion configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Weather backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the aggregated weather service
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_backend_max_retries")]
    pub max_retries: u32,
    /// Number of forecast days requested
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

/// Geocoding (location suggestion) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Number of suggestions requested
    #[serde(default = "default_suggestion_count")]
    pub count: u32,
    #[serde(default = "default_language")]
    pub language: String,
    /// Delay after the last keystroke before a lookup fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Search behaviour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// How long a search error stays visible
    #[serde(default = "default_error_dismiss_seconds")]
    pub error_dismiss_seconds: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_backend_timeout() -> u32 {
    30
}

fn default_backend_max_retries() -> u32 {
    2
}

fn default_forecast_days() -> u32 {
    7
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_suggestion_count() -> u32 {
    5
}

fn default_language() -> String {
    "en".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_error_dismiss_seconds() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            timeout_seconds: default_backend_timeout(),
            max_retries: default_backend_max_retries(),
            forecast_days: default_forecast_days(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            count: default_suggestion_count(),
            language: default_language(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            error_dismiss_seconds: default_error_dismiss_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl SkylensConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SKYLENS_BACKEND__BASE_URL, SKYLENS_LOGGING__LEVEL, ...
        builder = builder.add_source(
            Environment::with_prefix("SKYLENS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SkylensConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if let Ok(base) = std::env::var(API_BASE_ENV) {
            config.backend.base_url = base;
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skylens").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.trim().is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_backend_timeout();
        }
        if self.backend.forecast_days == 0 {
            self.backend.forecast_days = default_forecast_days();
        }
        if self.geocoding.base_url.trim().is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.count == 0 {
            self.geocoding.count = default_suggestion_count();
        }
        if self.geocoding.language.is_empty() {
            self.geocoding.language = default_language();
        }
        if self.search.error_dismiss_seconds == 0 {
            self.search.error_dismiss_seconds = default_error_dismiss_seconds();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.backend.timeout_seconds > 300 {
            return Err(SkylensError::config("Backend timeout cannot exceed 300 seconds").into());
        }

        if self.backend.max_retries > 10 {
            return Err(SkylensError::config("Backend max retries cannot exceed 10").into());
        }

        if !(1..=16).contains(&self.backend.forecast_days) {
            return Err(SkylensError::config("Forecast days must be between 1 and 16").into());
        }

        if !(1..=20).contains(&self.geocoding.count) {
            return Err(SkylensError::config("Suggestion count must be between 1 and 20").into());
        }

        if self.geocoding.debounce_ms > 5000 {
            return Err(SkylensError::config("Suggestion debounce cannot exceed 5000 ms").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkylensError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkylensError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Backend", &self.backend.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SkylensError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SkylensConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.backend.forecast_days, 7);
        assert_eq!(config.geocoding.count, 5);
        assert_eq!(config.geocoding.debounce_ms, 300);
        assert_eq!(config.search.error_dismiss_seconds, 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = SkylensConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = SkylensConfig::default();
        config.backend.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = SkylensConfig::default();
        config.backend.forecast_days = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_url_scheme() {
        let mut config = SkylensConfig::default();
        config.backend.base_url = "localhost:5000".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Backend base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = SkylensConfig::default();
        config.backend.base_url = String::new();
        config.geocoding.count = 0;
        config.search.error_dismiss_seconds = 0;
        config.apply_defaults();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.geocoding.count, 5);
        assert_eq!(config.search.error_dismiss_seconds, 3);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("skylens-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"https://weather.example.com\"\nforecast_days = 5\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = SkylensConfig::load_from_path(Some(path.clone()));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        // SKYLENS_API_BASE in the test environment would win over the file
        if std::env::var(API_BASE_ENV).is_err() {
            assert_eq!(config.backend.base_url, "https://weather.example.com");
        }
        assert_eq!(config.backend.forecast_days, 5);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.geocoding.language, "en");
    }

    #[test]
    fn test_load_without_config_file() {
        let has_user_file = SkylensConfig::get_config_path().is_some_and(|p| p.exists());
        if has_user_file || std::env::vars().any(|(k, _)| k.starts_with("SKYLENS")) {
            return;
        }
        let config = SkylensConfig::load().unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.geocoding.debounce_ms, 300);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = SkylensConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("skylens"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
