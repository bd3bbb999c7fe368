//! Error types and handling for the weather records service

use thiserror::Error;

/// Longest slice of an upstream error body kept in the error message
pub const UPSTREAM_BODY_LIMIT: usize = 200;

/// Main error type for the weather records service
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Malformed or missing caller-supplied input
    #[error("{message}")]
    InvalidInput { message: String },

    /// Valid input that matched nothing
    #[error("{message}")]
    NotFound { message: String },

    /// A geocoding, weather or encyclopedia provider failed or returned nothing usable
    #[error("{message}")]
    Upstream {
        message: String,
        status: Option<u16>,
    },

    /// Record store failures
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Upstream failure without an HTTP status (timeouts, transport, decoding)
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
            status: None,
        }
    }

    /// Upstream answered with a non-success status; the body is truncated
    pub fn upstream_status(status: u16, body: &str) -> Self {
        let body: String = body.chars().take(UPSTREAM_BODY_LIMIT).collect();
        Self::Upstream {
            message: format!("Upstream HTTP {status}: {body}"),
            status: Some(status),
        }
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors caused by the caller rather than by this service or its dependencies
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::NotFound { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::InvalidInput { message } | WeatherError::NotFound { message } => {
                message.clone()
            }
            WeatherError::Upstream { message, .. } => message.clone(),
            WeatherError::Storage { .. } => {
                "Record storage failed. Please try again later.".to_string()
            }
            WeatherError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}

impl From<anyhow::Error> for WeatherError {
    fn from(err: anyhow::Error) -> Self {
        WeatherError::storage(format!("{err:#}"))
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::upstream(format!("Upstream request timed out: {err}"))
        } else if err.is_decode() {
            WeatherError::upstream(format!("Upstream returned malformed data: {err}"))
        } else {
            WeatherError::upstream(format!("Upstream request failed: {err}"))
        }
    }
}
