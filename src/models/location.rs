//! Resolved location model

use serde::{Deserialize, Serialize};

/// A place the caller asked about, resolved to coordinates and a display name
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedLocation {
    /// Trimmed input as the caller typed it
    pub query: String,
    /// Human-readable display name
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl ResolvedLocation {
    #[must_use]
    pub fn new(query: String, name: String, latitude: f64, longitude: f64) -> Self {
        Self {
            query,
            name,
            latitude,
            longitude,
        }
    }

    /// Coordinate-based label used when no place name is known
    #[must_use]
    pub fn coordinate_label(latitude: f64, longitude: f64) -> String {
        // Adding positive zero turns -0.0 into 0.0
        let (latitude, longitude) = (latitude + 0.0, longitude + 0.0);
        format!("Lat {latitude:.4}, Lon {longitude:.4}")
    }
}

/// One geocoding match as ranked by the provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GeocodingCandidate {
    pub name: String,
    /// First-level administrative area (state, province, region)
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeocodingCandidate {
    /// Non-empty parts of `name, region, country` joined with ", "
    #[must_use]
    pub fn display_name(&self) -> String {
        [
            Some(self.name.as_str()),
            self.region.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
