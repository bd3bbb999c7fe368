//! Weather records service
//!
//! Resolves free-text or coordinate locations, fetches current conditions
//! and date-range temperatures from archive and forecast sources, and keeps
//! user-created weather records with CRUD and multi-format export.

pub mod api;
pub mod config;
pub mod dates;
pub mod error;
pub mod http;
pub mod insights;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod records;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::AppConfig;
pub use error::WeatherError;
pub use location_resolver::{DisplayName, GeocodingProvider, LocationInput, LocationParser, LocationResolver};
pub use models::{DailyTemperatureSample, DateInterval, ResolvedLocation, TemperatureSummary, WeatherRecord};
pub use records::{RecordService, RecordStore};
pub use weather::{CurrentConditionsFetcher, SummaryBuilder, TemperatureRangeFetcher, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;
