//! Location Resolution Module
//!
//! Turns free-form user input into a [`ResolvedLocation`]. Input that looks
//! like a `lat,lon` pair resolves to those exact coordinates and is only named
//! via reverse geocoding; anything else is looked up by name.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::models::{GeocodingCandidate, ResolvedLocation};
use crate::{Result, WeatherError};

/// Forward and reverse geocoding
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Candidates for a free-text query, best match first
    async fn search(&self, name: &str) -> Result<Vec<GeocodingCandidate>>;

    /// The place nearest to a coordinate, if any
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<GeocodingCandidate>>;
}

/// How a raw location string should be resolved
#[derive(Debug, Clone, PartialEq)]
pub enum LocationInput {
    Coordinates(f64, f64),
    Name(String),
}

pub struct LocationParser;

impl LocationParser {
    /// Classify trimmed, non-empty input.
    ///
    /// A pair only counts as coordinates when both halves are plain decimal
    /// numbers and they fall within latitude/longitude bounds. Anything else,
    /// including out-of-range pairs like `91,0`, is treated as a name.
    #[must_use]
    pub fn parse(input: &str) -> LocationInput {
        match Self::parse_coordinates(input) {
            Some((lat, lon)) => LocationInput::Coordinates(lat, lon),
            None => LocationInput::Name(input.to_string()),
        }
    }

    fn parse_coordinates(input: &str) -> Option<(f64, f64)> {
        let (lat, lon) = input.split_once(',')?;
        let lat = Self::parse_number(lat.trim())?;
        let lon = Self::parse_number(lon.trim())?;

        if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
            Some((lat, lon))
        } else {
            None
        }
    }

    /// `[+-]?digits(.digits)?` and nothing else
    fn parse_number(text: &str) -> Option<f64> {
        let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (unsigned, None),
        };

        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !fraction.is_none_or(all_digits) {
            return None;
        }

        text.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Display name for a coordinate pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayName {
    /// Named by reverse geocoding
    Resolved(String),
    /// No usable place name; holds the coordinate label
    Fallback(String),
}

impl DisplayName {
    #[must_use]
    pub fn into_inner(self) -> String {
        match self {
            DisplayName::Resolved(name) | DisplayName::Fallback(name) => name,
        }
    }
}

/// Service for resolving location inputs
pub struct LocationResolver;

impl LocationResolver {
    /// Resolve raw user input into coordinates and a display name
    #[instrument(skip(geocoder))]
    pub async fn resolve(geocoder: &dyn GeocodingProvider, raw: &str) -> Result<ResolvedLocation> {
        let query = raw.trim();
        if query.is_empty() {
            return Err(WeatherError::invalid_input("Location is required."));
        }

        let location = match LocationParser::parse(query) {
            LocationInput::Coordinates(lat, lon) => {
                Self::resolve_coordinates(geocoder, query, lat, lon).await
            }
            LocationInput::Name(name) => Self::resolve_name(geocoder, &name).await?,
        };

        debug!(
            "Resolved location: {} at ({}, {})",
            location.name, location.latitude, location.longitude
        );

        Ok(location)
    }

    /// Coordinates always come from the input; reverse geocoding only supplies the name
    async fn resolve_coordinates(
        geocoder: &dyn GeocodingProvider,
        query: &str,
        lat: f64,
        lon: f64,
    ) -> ResolvedLocation {
        let name = Self::name_coordinates(geocoder, lat, lon).await.into_inner();
        ResolvedLocation::new(query.to_string(), name, lat, lon)
    }

    /// Name a coordinate pair. Every reverse geocoding failure (error, no
    /// result, blank result) becomes [`DisplayName::Fallback`].
    pub async fn name_coordinates(geocoder: &dyn GeocodingProvider, lat: f64, lon: f64) -> DisplayName {
        match geocoder.reverse(lat, lon).await {
            Ok(Some(candidate)) => {
                let display = candidate.display_name();
                if display.is_empty() {
                    debug!("Reverse geocoding returned a blank place, using coordinates as name");
                    DisplayName::Fallback(ResolvedLocation::coordinate_label(lat, lon))
                } else {
                    DisplayName::Resolved(display)
                }
            }
            Ok(None) => {
                debug!("No reverse geocoding results found, using coordinates as name");
                DisplayName::Fallback(ResolvedLocation::coordinate_label(lat, lon))
            }
            Err(e) => {
                warn!("Reverse geocoding failed: {}, using coordinates as name", e);
                DisplayName::Fallback(ResolvedLocation::coordinate_label(lat, lon))
            }
        }
    }

    async fn resolve_name(geocoder: &dyn GeocodingProvider, name: &str) -> Result<ResolvedLocation> {
        debug!("Geocoding location name: {}", name);

        let candidate = geocoder
            .search(name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                WeatherError::not_found(
                    "Location not found. Try a city, postal code, landmark, or lat,lon.",
                )
            })?;

        let display = candidate.display_name();
        let display = if display.is_empty() {
            candidate.name.clone()
        } else {
            display
        };

        Ok(ResolvedLocation::new(
            name.to_string(),
            display,
            candidate.latitude,
            candidate.longitude,
        ))
    }
}
