//! Record create/update flows: validate, resolve, fetch, summarize, store

use std::sync::Arc;

use tracing::{info, instrument};

use super::RecordStore;
use crate::dates::{Clock, days_inclusive, is_valid_date, parse_date};
use crate::location_resolver::{GeocodingProvider, LocationResolver};
use crate::models::{DateInterval, RecordDraft, RecordPayload, RecordRequest, WeatherRecord};
use crate::weather::{SummaryBuilder, TemperatureRangeFetcher, WeatherProvider};
use crate::{Result, WeatherError};

/// Check a create/update body and turn it into a [`RecordRequest`]
pub fn validate_record_payload(payload: &RecordPayload, max_days: i64) -> Result<RecordRequest> {
    let location = payload.location.as_deref().unwrap_or_default().trim();
    let start = payload.start_date.as_deref().unwrap_or_default().trim();
    let end = payload.end_date.as_deref().unwrap_or_default().trim();

    if location.is_empty() {
        return Err(WeatherError::invalid_input("location is required."));
    }

    if !is_valid_date(start) || !is_valid_date(end) {
        return Err(WeatherError::invalid_input(
            "startDate and endDate must use YYYY-MM-DD format.",
        ));
    }

    let interval = DateInterval::new(parse_date(start)?, parse_date(end)?)?;
    if days_inclusive(interval.start, interval.end) > max_days {
        return Err(WeatherError::invalid_input(format!(
            "Date range cannot exceed {max_days} days."
        )));
    }

    Ok(RecordRequest {
        location: location.to_string(),
        interval,
    })
}

pub struct RecordService {
    geocoder: Arc<dyn GeocodingProvider>,
    weather: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
    store: Arc<RecordStore>,
    max_range_days: i64,
}

impl RecordService {
    #[must_use]
    pub fn new(
        geocoder: Arc<dyn GeocodingProvider>,
        weather: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
        store: Arc<RecordStore>,
        max_range_days: i64,
    ) -> Self {
        Self {
            geocoder,
            weather,
            clock,
            store,
            max_range_days,
        }
    }

    pub async fn list(&self, limit: usize) -> Result<Vec<WeatherRecord>> {
        self.store.list(limit).await
    }

    pub async fn list_all(&self) -> Result<Vec<WeatherRecord>> {
        self.store.list_all().await
    }

    pub async fn get(&self, id: u64) -> Result<WeatherRecord> {
        self.store.get(id).await?.ok_or_else(record_not_found)
    }

    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &RecordPayload) -> Result<WeatherRecord> {
        let request = validate_record_payload(payload, self.max_range_days)?;
        let draft = self.build_draft(&request).await?;
        let record = self.store.create(draft, self.clock.now()).await?;

        info!(
            "Created record {} for {} ({}..{})",
            record.id, record.location_name, record.start_date, record.end_date
        );
        Ok(record)
    }

    /// Fields missing from `payload` keep their stored values
    #[instrument(skip(self, payload))]
    pub async fn update(&self, id: u64, payload: &RecordPayload) -> Result<WeatherRecord> {
        let existing = self.get(id).await?;

        let merged = RecordPayload {
            location: payload.location.clone().or(Some(existing.location_query)),
            start_date: payload.start_date.clone().or(Some(existing.start_date)),
            end_date: payload.end_date.clone().or(Some(existing.end_date)),
        };
        let request = validate_record_payload(&merged, self.max_range_days)?;
        let draft = self.build_draft(&request).await?;

        let record = self
            .store
            .update(id, draft, self.clock.now())
            .await?
            .ok_or_else(record_not_found)?;

        info!("Updated record {}", record.id);
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(record_not_found());
        }
        info!("Deleted record {}", id);
        Ok(())
    }

    async fn build_draft(&self, request: &RecordRequest) -> Result<RecordDraft> {
        let location = LocationResolver::resolve(self.geocoder.as_ref(), &request.location).await?;
        let samples = TemperatureRangeFetcher::fetch(
            self.weather.as_ref(),
            self.clock.as_ref(),
            &location,
            request.interval,
        )
        .await?;
        let summary = SummaryBuilder::summarize(samples, self.clock.now());

        Ok(RecordDraft::new(&location, &request.interval, summary))
    }
}

fn record_not_found() -> WeatherError {
    WeatherError::not_found("Record not found.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn payload(location: Option<&str>, start: Option<&str>, end: Option<&str>) -> RecordPayload {
        RecordPayload {
            location: location.map(str::to_string),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_payload_is_trimmed() {
        let request = validate_record_payload(
            &payload(Some("  Oslo "), Some(" 2024-01-01"), Some("2024-01-31 ")),
            31,
        )
        .unwrap();
        assert_eq!(request.location, "Oslo");
        assert_eq!(request.interval.day_count(), 31);
    }

    #[rstest]
    #[case(payload(None, Some("2024-01-01"), Some("2024-01-02")), "location is required.")]
    #[case(payload(Some("   "), Some("2024-01-01"), Some("2024-01-02")), "location is required.")]
    #[case(
        payload(Some("Oslo"), Some("2024-1-01"), Some("2024-01-02")),
        "startDate and endDate must use YYYY-MM-DD format."
    )]
    #[case(
        payload(Some("Oslo"), Some("2024-02-30"), Some("2024-03-02")),
        "startDate and endDate must use YYYY-MM-DD format."
    )]
    #[case(
        payload(Some("Oslo"), Some("2024-01-01"), None),
        "startDate and endDate must use YYYY-MM-DD format."
    )]
    #[case(
        payload(Some("Oslo"), Some("2024-01-05"), Some("2024-01-01")),
        "startDate must be earlier than or equal to endDate."
    )]
    #[case(
        payload(Some("Oslo"), Some("2024-01-01"), Some("2024-02-01")),
        "Date range cannot exceed 31 days."
    )]
    fn test_invalid_payloads(#[case] input: RecordPayload, #[case] message: &str) {
        let err = validate_record_payload(&input, 31).unwrap_err();
        assert!(matches!(err, WeatherError::InvalidInput { .. }));
        assert_eq!(err.to_string(), message);
    }
}
