//! Location Lookup Errors

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, LocationError>;

#[derive(Error, Debug)]
pub enum LocationError {
    /// Geocoding service unreachable or failing
    #[error("Network error: {0}")]
    Network(String),

    /// Geocoder had no match for the input
    #[error("Location not found: {0}")]
    NotFound(String),

    /// Geocoder answered with something unusable
    #[error("Bad geocoder response: {0}")]
    Parse(String),

    /// Bundled data or pattern failed to load
    #[error("Data error: {0}")]
    Data(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LocationError {
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for LocationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
