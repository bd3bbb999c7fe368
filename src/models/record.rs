//! Persisted weather records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ResolvedLocation, TemperatureSummary};
use crate::models::DateInterval;

/// A saved location + date range with its computed temperatures
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub id: u64,
    pub location_query: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub temperature_payload: TemperatureSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything about a record except the fields the store assigns
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    pub location_query: String,
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: String,
    pub end_date: String,
    pub temperature_payload: TemperatureSummary,
}

impl RecordDraft {
    #[must_use]
    pub fn new(
        location: &ResolvedLocation,
        interval: &DateInterval,
        temperature_payload: TemperatureSummary,
    ) -> Self {
        Self {
            location_query: location.query.clone(),
            location_name: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            start_date: crate::dates::format_date(interval.start),
            end_date: crate::dates::format_date(interval.end),
            temperature_payload,
        }
    }

    #[must_use]
    pub fn into_record(self, id: u64, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> WeatherRecord {
        WeatherRecord {
            id,
            location_query: self.location_query,
            location_name: self.location_name,
            latitude: self.latitude,
            longitude: self.longitude,
            start_date: self.start_date,
            end_date: self.end_date,
            temperature_payload: self.temperature_payload,
            created_at,
            updated_at,
        }
    }
}

/// Raw create/update body; absent fields fall back to the stored record on update
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A validated create/update request
#[derive(Debug, Clone, PartialEq)]
pub struct RecordRequest {
    pub location: String,
    pub interval: DateInterval,
}
