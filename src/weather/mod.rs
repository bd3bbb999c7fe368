//! Weather retrieval
//!
//! Provider traits for the archive and forecast sources, the date-range
//! fetcher that splits a request between them, the summary reducer and the
//! live-conditions fetcher.

use async_trait::async_trait;

use crate::Result;
use crate::models::{CurrentSnapshot, DailyTemperatureSample, DateInterval, ForecastDay};

pub mod current;
pub mod open_meteo;
pub mod range;
pub mod summary;

pub use current::{CurrentConditionsFetcher, FORECAST_DAYS};
pub use open_meteo::OpenMeteoClient;
pub use range::{Segment, SegmentSource, TemperatureRangeFetcher, plan_segments};
pub use summary::SummaryBuilder;

/// What the forecast source returns for a "current + N days" request
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReport {
    /// Absent when the provider omitted the current block
    pub current: Option<CurrentSnapshot>,
    pub forecast: Vec<ForecastDay>,
}

/// Daily temperature and live-condition data for a coordinate
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Observed daily min/max for a past, non-empty range
    async fn archive_daily(
        &self,
        latitude: f64,
        longitude: f64,
        interval: DateInterval,
    ) -> Result<Vec<DailyTemperatureSample>>;

    /// Predicted daily min/max for a range starting today or later
    async fn forecast_daily(
        &self,
        latitude: f64,
        longitude: f64,
        interval: DateInterval,
    ) -> Result<Vec<DailyTemperatureSample>>;

    /// Instantaneous conditions plus a `days`-long daily forecast
    async fn current(&self, latitude: f64, longitude: f64, days: u8) -> Result<CurrentReport>;
}
