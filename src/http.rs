//! Shared HTTP client for upstream providers
//!
//! One GET per call, bounded by the configured timeout. Non-success statuses
//! and timeouts surface as [`WeatherError::Upstream`]; nothing is retried.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;
use crate::{Result, WeatherError};

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct UpstreamHttp {
    client: Client,
}

impl UpstreamHttp {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body as JSON
    #[instrument(name = "upstream_get", level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let elapsed = start.elapsed();

        debug!("HTTP {} in {:.3}s", status, elapsed.as_secs_f64());
        if elapsed > SLOW_RESPONSE {
            warn!("Slow upstream response: {:.3}s", elapsed.as_secs_f64());
        }

        if !status.is_success() {
            return Err(WeatherError::upstream_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::upstream(format!("Upstream returned malformed JSON: {e}"))
        })
    }
}
