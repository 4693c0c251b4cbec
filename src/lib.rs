//! `Skylens` - weather dashboard client
//!
//! Fetches aggregated forecasts from the weather backend, normalizes the
//! loosely shaped payload into a strict [`WeatherModel`] and keeps the
//! dashboard on the most recently submitted search.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod daylight;
pub mod error;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod suggest;
pub mod tips;

// Re-export core types for public API
pub use api::{WeatherApiClient, WeatherBackend};
pub use config::SkylensConfig;
pub use coordinator::{DashboardState, SearchCoordinator, SearchOutcome};
pub use error::{ErrorCode, SearchError, SkylensError};
pub use models::{LocationSuggestion, WeatherModel, WeatherQuery, WeatherType};
pub use normalize::normalize;
pub use suggest::SuggestionLookup;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkylensError>;
