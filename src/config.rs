//! Configuration management for the weather records service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::{Result, WeatherError};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub records: RecordsConfig,
    pub meta: MetaConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for non-API paths
    pub static_dir: String,
    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
}

/// Upstream provider endpoints and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    pub archive_url: String,
    pub wikipedia_api_url: String,
    pub wikipedia_rest_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Record store location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// Limits applied to weather records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsConfig {
    pub max_range_days: i64,
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Text served by the meta endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    pub candidate_name: String,
    pub description: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_body_limit() -> usize {
    1024 * 1024
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1".to_string()
}

fn default_wikipedia_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_wikipedia_rest_url() -> String {
    "https://en.wikipedia.org/api/rest_v1".to_string()
}

fn default_upstream_timeout() -> u64 {
    12
}

fn default_user_agent() -> String {
    format!("weather-records/{}", env!("CARGO_PKG_VERSION"))
}

fn default_storage_path() -> String {
    "weather.db".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_range_days() -> i64 {
    31
}

fn default_record_limit() -> usize {
    100
}

fn default_max_record_limit() -> usize {
    500
}

fn default_candidate_name() -> String {
    "Your Name".to_string()
}

fn default_description() -> String {
    "PM Accelerator is a career accelerator focused on helping product managers and aspiring PMs build practical, job-ready product skills through mentorship, real-world projects, and a strong professional community.".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            archive_url: default_archive_url(),
            wikipedia_api_url: default_wikipedia_api_url(),
            wikipedia_rest_url: default_wikipedia_rest_url(),
            timeout_seconds: default_upstream_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            max_range_days: default_max_range_days(),
            default_limit: default_record_limit(),
            max_limit: default_max_record_limit(),
        }
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            candidate_name: default_candidate_name(),
            description: default_description(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WEATHER_RECORDS__SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("WEATHER_RECORDS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| WeatherError::config(format!("Failed to build configuration: {e}")))?;

        let mut config: AppConfig = settings.try_deserialize().map_err(|e| {
            WeatherError::config(format!("Failed to deserialize configuration: {e}"))
        })?;

        config.apply_env_shortcuts();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-records").join("config.toml"))
    }

    /// Honour the conventional `PORT` and `CANDIDATE_NAME` variables
    fn apply_env_shortcuts(&mut self) {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(name) = std::env::var("CANDIDATE_NAME") {
            if !name.trim().is_empty() {
                self.meta.candidate_name = name;
            }
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.server.body_limit_bytes == 0 {
            self.server.body_limit_bytes = default_body_limit();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.upstream.user_agent.is_empty() {
            self.upstream.user_agent = default_user_agent();
        }
        if self.storage.path.is_empty() {
            self.storage.path = default_storage_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.records.max_range_days == 0 {
            self.records.max_range_days = default_max_range_days();
        }
        if self.records.default_limit == 0 {
            self.records.default_limit = default_record_limit();
        }
        if self.records.max_limit == 0 {
            self.records.max_limit = default_max_record_limit();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=120).contains(&self.upstream.timeout_seconds) {
            return Err(WeatherError::config(
                "Upstream timeout must be between 1 and 120 seconds",
            ));
        }

        if self.records.max_range_days < 1 {
            return Err(WeatherError::config("Record range limit must be at least 1 day"));
        }

        if self.records.default_limit > self.records.max_limit {
            return Err(WeatherError::config(
                "Default record limit cannot exceed the maximum record limit",
            ));
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            )));
        }

        let urls = [
            ("geocoding_url", &self.upstream.geocoding_url),
            ("forecast_url", &self.upstream.forecast_url),
            ("archive_url", &self.upstream.archive_url),
            ("wikipedia_api_url", &self.upstream.wikipedia_api_url),
            ("wikipedia_rest_url", &self.upstream.wikipedia_rest_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherError::config(format!(
                    "Upstream {name} must be a valid HTTP or HTTPS URL"
                )));
            }
        }

        Ok(())
    }

    /// Listener address as `host:port`
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
