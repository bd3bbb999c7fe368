use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::AppState;
use crate::insights::LocationInsights;
use crate::location_resolver::LocationResolver;
use crate::models::{CurrentConditions, ResolvedLocation};
use crate::weather::CurrentConditionsFetcher;
use crate::{Result, WeatherError};

#[derive(Debug, Deserialize)]
pub(super) struct WeatherQuery {
    location: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

impl WeatherQuery {
    /// `location` wins; otherwise `lat` and `lon` are joined into a pair
    fn location_input(&self) -> Option<String> {
        let location = self.location.as_deref().unwrap_or_default().trim();
        if !location.is_empty() {
            return Some(location.to_string());
        }

        match (self.lat.as_deref(), self.lon.as_deref()) {
            (Some(lat), Some(lon)) if !lat.is_empty() && !lon.is_empty() => {
                Some(format!("{lat},{lon}"))
            }
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub(super) struct WeatherResponse {
    location: ResolvedLocation,
    weather: CurrentConditions,
    insights: LocationInsights,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct MetaResponse {
    candidate_name: String,
    pma_description: String,
}

pub(super) async fn get_meta(State(state): State<Arc<AppState>>) -> Json<MetaResponse> {
    Json(MetaResponse {
        candidate_name: state.config.meta.candidate_name.clone(),
        pma_description: state.config.meta.description.clone(),
    })
}

#[instrument(skip(state))]
pub(super) async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>> {
    let input = query.location_input().ok_or_else(|| {
        WeatherError::invalid_input("Provide `location` or `lat` and `lon` query params.")
    })?;

    let location = LocationResolver::resolve(state.geocoder.as_ref(), &input).await?;
    let weather = CurrentConditionsFetcher::fetch_current(state.weather.as_ref(), &location).await?;
    let insights = state.insights.build_insights(&location).await;

    Ok(Json(WeatherResponse {
        location,
        weather,
        insights,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(location: Option<&str>, lat: Option<&str>, lon: Option<&str>) -> WeatherQuery {
        WeatherQuery {
            location: location.map(str::to_string),
            lat: lat.map(str::to_string),
            lon: lon.map(str::to_string),
        }
    }

    #[test]
    fn test_location_param_wins() {
        let q = query(Some(" Oslo "), Some("1"), Some("2"));
        assert_eq!(q.location_input().as_deref(), Some("Oslo"));
    }

    #[test]
    fn test_lat_lon_are_joined() {
        let q = query(Some("  "), Some("40.7"), Some("-74"));
        assert_eq!(q.location_input().as_deref(), Some("40.7,-74"));
    }

    #[test]
    fn test_missing_everything() {
        assert_eq!(query(None, Some("40.7"), None).location_input(), None);
        assert_eq!(query(None, None, None).location_input(), None);
    }
}
