//! `OpenMeteo` geocoding, archive and forecast adapters

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::{CurrentReport, WeatherProvider};
use crate::Result;
use crate::config::UpstreamConfig;
use crate::dates::{DATE_FORMAT, format_date};
use crate::http::UpstreamHttp;
use crate::location_resolver::GeocodingProvider;
use crate::models::{
    CurrentSnapshot, DailyTemperatureSample, DateInterval, ForecastDay, GeocodingCandidate,
};

const DAILY_TEMPERATURE_FIELDS: &str = "temperature_2m_min,temperature_2m_max";
const CURRENT_FIELDS: &str =
    "temperature_2m,apparent_temperature,relative_humidity_2m,weather_code,wind_speed_10m,is_day";
const FORECAST_DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunrise,sunset";

/// Client for the `OpenMeteo` family of APIs (no API key required)
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: UpstreamHttp,
    geocoding_url: String,
    forecast_url: String,
    archive_url: String,
}

impl OpenMeteoClient {
    pub fn new(http: UpstreamHttp, config: &UpstreamConfig) -> Self {
        Self {
            http,
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
            forecast_url: config.forecast_url.trim_end_matches('/').to_string(),
            archive_url: config.archive_url.trim_end_matches('/').to_string(),
        }
    }

    async fn daily_range(
        &self,
        base_url: &str,
        endpoint: &str,
        latitude: f64,
        longitude: f64,
        interval: DateInterval,
    ) -> Result<Vec<DailyTemperatureSample>> {
        let url = format!(
            "{base_url}/{endpoint}?latitude={latitude}&longitude={longitude}&start_date={}&end_date={}&daily={DAILY_TEMPERATURE_FIELDS}&timezone=auto",
            format_date(interval.start),
            format_date(interval.end),
        );

        let response: DailyResponse = self.http.get_json(&url).await?;
        let samples = response
            .daily
            .map(|daily| daily.temperature_samples())
            .unwrap_or_default();

        info!(
            "Received {} daily samples from {} for {}..{}",
            samples.len(),
            endpoint,
            interval.start,
            interval.end
        );
        Ok(samples)
    }
}

#[async_trait]
impl GeocodingProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn search(&self, name: &str) -> Result<Vec<GeocodingCandidate>> {
        let url = format!(
            "{}/search?name={}&count=5&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name)
        );

        let response: GeocodingResponse = self.http.get_json(&url).await?;
        let candidates: Vec<GeocodingCandidate> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(Into::into)
            .collect();

        if candidates.is_empty() {
            warn!("No geocoding results for '{}'", name);
        } else {
            debug!(
                "Geocoding results: {:?}",
                candidates
                    .iter()
                    .map(|c| format!("{} ({:.4}, {:.4})", c.name, c.latitude, c.longitude))
                    .collect::<Vec<_>>()
            );
        }

        Ok(candidates)
    }

    #[instrument(skip(self))]
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<GeocodingCandidate>> {
        let url = format!(
            "{}/reverse?latitude={latitude}&longitude={longitude}&count=1&language=en&format=json",
            self.geocoding_url
        );

        let response: GeocodingResponse = self.http.get_json(&url).await?;
        Ok(response
            .results
            .and_then(|results| results.into_iter().next())
            .map(Into::into))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn archive_daily(
        &self,
        latitude: f64,
        longitude: f64,
        interval: DateInterval,
    ) -> Result<Vec<DailyTemperatureSample>> {
        self.daily_range(&self.archive_url, "archive", latitude, longitude, interval)
            .await
    }

    #[instrument(skip(self))]
    async fn forecast_daily(
        &self,
        latitude: f64,
        longitude: f64,
        interval: DateInterval,
    ) -> Result<Vec<DailyTemperatureSample>> {
        self.daily_range(&self.forecast_url, "forecast", latitude, longitude, interval)
            .await
    }

    #[instrument(skip(self))]
    async fn current(&self, latitude: f64, longitude: f64, days: u8) -> Result<CurrentReport> {
        let url = format!(
            "{}/forecast?latitude={latitude}&longitude={longitude}&current={CURRENT_FIELDS}&daily={FORECAST_DAILY_FIELDS}&forecast_days={days}&timezone=auto",
            self.forecast_url
        );

        let response: ForecastResponse = self.http.get_json(&url).await?;
        Ok(CurrentReport {
            current: response.current.map(Into::into),
            forecast: response
                .daily
                .map(|daily| daily.forecast_days())
                .unwrap_or_default(),
        })
    }
}

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    #[serde(default)]
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

impl From<GeocodingResult> for GeocodingCandidate {
    fn from(result: GeocodingResult) -> Self {
        Self {
            name: result.name,
            region: result.admin1,
            country: result.country,
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentData>,
    daily: Option<DailyData>,
}

/// Daily columns from `OpenMeteo`; columns are parallel to `time` but may be
/// shorter, absent, or contain nulls
#[derive(Debug, Deserialize, Default)]
struct DailyData {
    #[serde(default)]
    time: Vec<String>,
    temperature_2m_min: Option<Vec<Option<f64>>>,
    temperature_2m_max: Option<Vec<Option<f64>>>,
    weather_code: Option<Vec<Option<i32>>>,
    precipitation_probability_max: Option<Vec<Option<f64>>>,
    sunrise: Option<Vec<Option<String>>>,
    sunset: Option<Vec<Option<String>>>,
}

/// Value at `idx`, treating a missing column, short column or null as absent
fn value_at<T: Clone>(column: Option<&Vec<Option<T>>>, idx: usize) -> Option<T> {
    column.and_then(|values| values.get(idx)).cloned().flatten()
}

impl DailyData {
    /// Parsed dates paired with their index; unparsable days are dropped
    fn dated_rows(&self) -> impl Iterator<Item = (usize, NaiveDate)> + '_ {
        self.time.iter().enumerate().filter_map(|(idx, day)| {
            match NaiveDate::parse_from_str(day, DATE_FORMAT) {
                Ok(date) => Some((idx, date)),
                Err(e) => {
                    warn!("Skipping daily entry with unparsable date '{}': {}", day, e);
                    None
                }
            }
        })
    }

    fn temperature_samples(&self) -> Vec<DailyTemperatureSample> {
        self.dated_rows()
            .map(|(idx, date)| DailyTemperatureSample {
                date,
                min_c: value_at(self.temperature_2m_min.as_ref(), idx),
                max_c: value_at(self.temperature_2m_max.as_ref(), idx),
            })
            .collect()
    }

    fn forecast_days(&self) -> Vec<ForecastDay> {
        self.dated_rows()
            .map(|(idx, date)| {
                let weather_code = value_at(self.weather_code.as_ref(), idx);
                ForecastDay {
                    date,
                    weather_code,
                    description: weather_code
                        .map_or("Unknown", weather_code_to_description)
                        .to_string(),
                    min_c: value_at(self.temperature_2m_min.as_ref(), idx),
                    max_c: value_at(self.temperature_2m_max.as_ref(), idx),
                    precipitation_probability_max: value_at(
                        self.precipitation_probability_max.as_ref(),
                        idx,
                    ),
                    sunrise: value_at(self.sunrise.as_ref(), idx),
                    sunset: value_at(self.sunset.as_ref(), idx),
                }
            })
            .collect()
    }
}

/// Current weather block from `OpenMeteo`
#[derive(Debug, Deserialize)]
struct CurrentData {
    #[serde(default)]
    time: String,
    temperature_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    relative_humidity_2m: Option<f64>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    is_day: Option<i64>,
}

impl From<CurrentData> for CurrentSnapshot {
    fn from(current: CurrentData) -> Self {
        Self {
            temperature_c: current.temperature_2m,
            apparent_temperature_c: current.apparent_temperature,
            relative_humidity: current.relative_humidity_2m,
            weather_code: current.weather_code,
            description: current
                .weather_code
                .map_or("Unknown", weather_code_to_description)
                .to_string(),
            wind_speed_kmh: current.wind_speed_10m,
            is_day: current.is_day == Some(1),
            time: current.time,
        }
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherError;
    use crate::location_resolver::{DisplayName, LocationResolver};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenMeteoClient {
        let config = UpstreamConfig {
            geocoding_url: server.uri(),
            forecast_url: server.uri(),
            archive_url: format!("{}/", server.uri()),
            timeout_seconds: 5,
            ..UpstreamConfig::default()
        };
        OpenMeteoClient::new(UpstreamHttp::new(&config).unwrap(), &config)
    }

    fn interval(start: &str, end: &str) -> DateInterval {
        DateInterval::parse(start, end).unwrap()
    }

    #[test]
    fn test_daily_columns_indexed_defensively() {
        let daily: DailyData = serde_json::from_value(serde_json::json!({
            "time": ["2024-06-10", "2024-06-11", "2024-06-12"],
            "temperature_2m_min": [10.5, null],
            "temperature_2m_max": [20.0, 21.5, 22.0]
        }))
        .unwrap();

        let samples = daily.temperature_samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].min_c, Some(10.5));
        assert_eq!(samples[1].min_c, None);
        assert_eq!(samples[2].min_c, None);
        assert_eq!(samples[2].max_c, Some(22.0));
    }

    #[test]
    fn test_missing_columns_yield_absent_values() {
        let daily: DailyData =
            serde_json::from_value(serde_json::json!({ "time": ["2024-06-10"] })).unwrap();
        let days = daily.forecast_days();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].weather_code, None);
        assert_eq!(days[0].description, "Unknown");
        assert_eq!(days[0].sunrise, None);
    }

    #[test]
    fn test_weather_code_descriptions() {
        assert_eq!(weather_code_to_description(0), "Clear sky");
        assert_eq!(weather_code_to_description(95), "Thunderstorm");
        assert_eq!(weather_code_to_description(1234), "Unknown");
    }

    #[tokio::test]
    async fn test_search_maps_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("name", "New York"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"name": "New York", "latitude": 40.71, "longitude": -74.01,
                     "country": "United States", "admin1": "New York"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let results = client.search("New York").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].region.as_deref(), Some("New York"));
        assert_eq!(results[0].display_name(), "New York, New York, United States");
    }

    #[tokio::test]
    async fn test_search_without_results_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.search("Nowhere").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reverse_maps_nearest_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("count", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [
                    {"name": "Bergen", "latitude": 60.39, "longitude": 5.32,
                     "country": "Norway", "admin1": "Vestland"}
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let nearest = client.reverse(60.39, 5.32).await.unwrap().unwrap();
        assert_eq!(nearest.display_name(), "Bergen, Vestland, Norway");
    }

    #[tokio::test]
    async fn test_reverse_without_results_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.reverse(10.0, 20.0).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverse_malformed_result_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"name": "Somewhere", "longitude": 20.0}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.reverse(10.0, 20.0).await.unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_malformed_reverse_falls_back_to_coordinate_label() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let location = LocationResolver::resolve(&client, "10,20").await.unwrap();
        assert_eq!(location.name, "Lat 10.0000, Lon 20.0000");
        assert_eq!(
            LocationResolver::name_coordinates(&client, 10.0, 20.0).await,
            DisplayName::Fallback("Lat 10.0000, Lon 20.0000".to_string())
        );
    }

    #[tokio::test]
    async fn test_archive_request_uses_archive_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archive"))
            .and(query_param("start_date", "2024-01-01"))
            .and(query_param("end_date", "2024-01-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "daily": {
                    "time": ["2024-01-01", "2024-01-02"],
                    "temperature_2m_min": [-1.0, -2.5],
                    "temperature_2m_max": [4.0, 3.0]
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let samples = client
            .archive_daily(40.0, -74.0, interval("2024-01-01", "2024-01-02"))
            .await
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].min_c, Some(-2.5));
    }

    #[tokio::test]
    async fn test_forecast_error_status_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"reason\":\"bad range\"}"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .forecast_daily(40.0, -74.0, interval("2024-06-15", "2024-06-20"))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { status: Some(400), .. }));
    }

    #[tokio::test]
    async fn test_current_report_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("forecast_days", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current": {
                    "time": "2024-06-15T12:00",
                    "temperature_2m": 24.3,
                    "apparent_temperature": 25.1,
                    "relative_humidity_2m": 60,
                    "weather_code": 2,
                    "wind_speed_10m": 11.2,
                    "is_day": 1
                },
                "daily": {
                    "time": ["2024-06-15"],
                    "weather_code": [3],
                    "temperature_2m_max": [27.0],
                    "temperature_2m_min": [16.0],
                    "precipitation_probability_max": [20],
                    "sunrise": ["2024-06-15T05:25"],
                    "sunset": ["2024-06-15T20:30"]
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let report = client.current(40.0, -74.0, 5).await.unwrap();
        let current = report.current.unwrap();
        assert_eq!(current.temperature_c, Some(24.3));
        assert_eq!(current.description, "Partly cloudy");
        assert!(current.is_day);
        assert_eq!(report.forecast.len(), 1);
        assert_eq!(report.forecast[0].description, "Overcast");
        assert_eq!(report.forecast[0].sunset.as_deref(), Some("2024-06-15T20:30"));
    }
}
