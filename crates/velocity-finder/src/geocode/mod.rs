//! Geocoding
//!
//! Turns ZIP codes and free-text place names into coordinates.

mod http;

pub use http::{HttpGeocoder, GeocoderConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Place resolved from a ZIP code
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZipPlace {
    pub place_name: String,
    /// Two-letter state code
    pub state: String,
    pub lat: f64,
    pub lng: f64,
}

/// Place resolved from a free-text search
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Geocoding backend
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a US ZIP code
    async fn locate_zip(&self, zip: &str) -> Result<ZipPlace>;

    /// Search US places by name, best match first
    async fn search(&self, query: &str) -> Result<Vec<PlaceMatch>>;

    /// Backend name for logs
    fn name(&self) -> &str;
}
