//! Data models for the weather records service
//!
//! This module contains the core domain models organized by concern:
//! - Location: resolved places and geocoding candidates
//! - Weather: date intervals, temperature series and live conditions
//! - Record: persisted weather records and their request payloads

pub mod location;
pub mod record;
pub mod weather;

// Re-export all public types for convenient access
pub use location::{GeocodingCandidate, ResolvedLocation};
pub use record::{RecordDraft, RecordPayload, RecordRequest, WeatherRecord};
pub use weather::{
    CurrentConditions, CurrentSnapshot, DailyTemperatureSample, DateInterval, ForecastDay,
    TemperatureSummary,
};
