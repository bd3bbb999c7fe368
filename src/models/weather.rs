//! Temperature series, summaries and live conditions

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::{days_inclusive, parse_date};
use crate::{Result, WeatherError};

/// Inclusive calendar date range with `start <= end`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "UncheckedInterval")]
pub struct DateInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct UncheckedInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<UncheckedInterval> for DateInterval {
    type Error = WeatherError;

    fn try_from(raw: UncheckedInterval) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(WeatherError::invalid_input(
                "startDate must be earlier than or equal to endDate.",
            ));
        }
        Ok(Self { start, end })
    }

    /// Parse two canonical `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    #[must_use]
    pub fn day_count(&self) -> i64 {
        days_inclusive(self.start, self.end)
    }
}

/// Daily minimum and maximum in Celsius; either may be missing upstream
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyTemperatureSample {
    pub date: NaiveDate,
    pub min_c: Option<f64>,
    pub max_c: Option<f64>,
}

/// Aggregate over a chronological temperature series
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureSummary {
    pub overall_min_c: Option<f64>,
    pub overall_max_c: Option<f64>,
    /// Samples actually returned, which may be fewer than the requested days
    pub day_count: usize,
    pub unit: String,
    pub generated_at: DateTime<Utc>,
    pub daily: Vec<DailyTemperatureSample>,
}

/// Live snapshot from the forecast provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSnapshot {
    pub temperature_c: Option<f64>,
    pub apparent_temperature_c: Option<f64>,
    pub relative_humidity: Option<f64>,
    pub weather_code: Option<i32>,
    pub description: String,
    pub wind_speed_kmh: Option<f64>,
    pub is_day: bool,
    /// Provider-local observation time, e.g. `2024-06-15T12:00`
    pub time: String,
}

/// One day of the short-range forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub weather_code: Option<i32>,
    pub description: String,
    pub min_c: Option<f64>,
    pub max_c: Option<f64>,
    pub precipitation_probability_max: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

/// Current conditions plus the next few days
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentConditions {
    pub current: CurrentSnapshot,
    pub forecast: Vec<ForecastDay>,
}
