//! JSON API mounted under `/api`

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::config::AppConfig;
use crate::dates::{Clock, SystemClock};
use crate::http::UpstreamHttp;
use crate::insights::InsightsClient;
use crate::location_resolver::GeocodingProvider;
use crate::records::{RecordService, RecordStore};
use crate::weather::{OpenMeteoClient, WeatherProvider};
use crate::{Result, WeatherError};

mod records;
mod weather;

/// Shared state handed to every handler
pub struct AppState {
    pub geocoder: Arc<dyn GeocodingProvider>,
    pub weather: Arc<dyn WeatherProvider>,
    pub insights: InsightsClient,
    pub records: RecordService,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the Open-Meteo providers, the insights client and the record store
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let http = UpstreamHttp::new(&config.upstream)?;
        let open_meteo = Arc::new(OpenMeteoClient::new(http.clone(), &config.upstream));
        let insights = InsightsClient::new(http, &config.upstream);
        let store = Arc::new(RecordStore::open(&config.storage.path)?);

        Ok(Self::new(open_meteo.clone(), open_meteo, Arc::new(SystemClock), store, insights, config))
    }

    #[must_use]
    pub fn new(
        geocoder: Arc<dyn GeocodingProvider>,
        weather: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
        store: Arc<RecordStore>,
        insights: InsightsClient,
        config: AppConfig,
    ) -> Self {
        let records = RecordService::new(
            geocoder.clone(),
            weather.clone(),
            clock,
            store,
            config.records.max_range_days,
        );
        Self {
            geocoder,
            weather,
            insights,
            records,
            config,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl WeatherError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            WeatherError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            WeatherError::NotFound { .. } => StatusCode::NOT_FOUND,
            WeatherError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            WeatherError::Storage { .. } | WeatherError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            debug!("Request rejected with {}: {}", status, self);
        }

        let body = ErrorBody {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, reporting any parse or content-type problem uniformly
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            debug!("Rejected request body: {}", rejection.body_text());
            WeatherError::invalid_input("Invalid JSON payload.")
        })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/meta", get(weather::get_meta))
        .route("/weather", get(weather::get_weather))
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        .route("/records/export", get(records::export_records))
        .route(
            "/records/{id}",
            get(records::get_record)
                .put(records::update_record)
                .delete(records::delete_record),
        )
        .fallback(route_not_found)
}

async fn route_not_found() -> WeatherError {
    WeatherError::not_found("Route not found.")
}
