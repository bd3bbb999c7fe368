//! Live conditions plus a short daily forecast

use tracing::{info, instrument};

use super::WeatherProvider;
use crate::models::{CurrentConditions, ResolvedLocation};
use crate::{Result, WeatherError};

/// Days of daily forecast returned alongside current conditions
pub const FORECAST_DAYS: u8 = 5;

pub struct CurrentConditionsFetcher;

impl CurrentConditionsFetcher {
    /// One call to the forecast source; a missing current block is an upstream error
    #[instrument(skip(provider, location), fields(location = %location.name))]
    pub async fn fetch_current(
        provider: &dyn WeatherProvider,
        location: &ResolvedLocation,
    ) -> Result<CurrentConditions> {
        let report = provider
            .current(location.latitude, location.longitude, FORECAST_DAYS)
            .await?;

        let current = report.current.ok_or_else(|| {
            WeatherError::upstream("Weather provider did not return current conditions.")
        })?;

        info!(
            "Current conditions for {}: {} with {} forecast days",
            location.name,
            current.description,
            report.forecast.len()
        );

        Ok(CurrentConditions {
            current,
            forecast: report.forecast,
        })
    }
}
