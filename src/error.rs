//! Error types and handling for `Skylens`

use thiserror::Error;

/// Message shown to the user for any failed search
pub const LOCATION_NOT_FOUND_MESSAGE: &str = "Location not found. Please try again.";

/// Classification of backend API failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Transport failure (connection refused, timeout, retries exhausted)
    ApiNetworkError,
    /// Response body could not be decoded as a weather payload
    ApiInvalidResponse,
    /// Backend answered 404
    ApiLocationNotFound,
    /// Any other non-success status
    ApiStatus,
}

/// Main error type for the `Skylens` library
#[derive(Error, Debug)]
pub enum SkylensError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Backend communication errors
    #[error("API error: {message}")]
    Api {
        message: String,
        code: ErrorCode,
        status: Option<u16>,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl SkylensError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S, code: ErrorCode) -> Self {
        Self::Api {
            message: message.into(),
            code,
            status: None,
        }
    }

    /// Create an API error for a non-success HTTP status
    pub fn api_status<S: Into<String>>(message: S, status: u16) -> Self {
        let code = if status == 404 {
            ErrorCode::ApiLocationNotFound
        } else {
            ErrorCode::ApiStatus
        };
        Self::Api {
            message: message.into(),
            code,
            status: Some(status),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// API error code, if this is an API error
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            SkylensError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkylensError::Config { .. } => {
                "Configuration error. Please check your config file and backend URL.".to_string()
            }
            SkylensError::Api { .. } => LOCATION_NOT_FOUND_MESSAGE.to_string(),
            SkylensError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            SkylensError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            SkylensError::General { message } => message.clone(),
        }
    }
}

/// Failure of a dashboard search that must be shown to the user.
///
/// Superseded searches never produce this; they resolve silently.
#[derive(Error, Debug)]
#[error("search for '{location}' failed: {source}")]
pub struct SearchError {
    /// Location as submitted
    pub location: String,
    /// Sequence number of the failed request
    pub seq: u64,
    #[source]
    pub source: SkylensError,
}

impl SearchError {
    /// The transient message displayed for every failed search
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        LOCATION_NOT_FOUND_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = SkylensError::config("bad url");
        assert!(matches!(config_err, SkylensError::Config { .. }));

        let api_err = SkylensError::api("connection failed", ErrorCode::ApiNetworkError);
        assert_eq!(api_err.code(), Some(ErrorCode::ApiNetworkError));

        let validation_err = SkylensError::validation("empty location");
        assert!(matches!(validation_err, SkylensError::Validation { .. }));
        assert_eq!(validation_err.code(), None);
    }

    #[test]
    fn test_status_codes() {
        let not_found = SkylensError::api_status("Backend error 404", 404);
        assert_eq!(not_found.code(), Some(ErrorCode::ApiLocationNotFound));

        let server = SkylensError::api_status("Backend error 500", 500);
        assert_eq!(server.code(), Some(ErrorCode::ApiStatus));
        assert!(matches!(server, SkylensError::Api { status: Some(500), .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = SkylensError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = SkylensError::api_status("Backend error 500", 500);
        assert_eq!(api_err.user_message(), LOCATION_NOT_FOUND_MESSAGE);

        let validation_err = SkylensError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_search_error_message_is_generic() {
        let err = SearchError {
            location: "Atlantis".to_string(),
            seq: 4,
            source: SkylensError::api("Invalid weather payload", ErrorCode::ApiInvalidResponse),
        };
        assert_eq!(err.user_message(), "Location not found. Please try again.");
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SkylensError = io_err.into();
        assert!(matches!(err, SkylensError::Io { .. }));
    }
}
