//! # velocity-finder
//!
//! Design wind speeds and components & cladding requirements by US ZIP code
//! or place name.
//!
//! ```rust,ignore
//! use velocity_finder::{HttpGeocoder, LocationService};
//!
//! let service = LocationService::new(HttpGeocoder::new()?)?;
//! if let Some(profile) = service.lookup("33109").await {
//!     println!("{} mph ({})", profile.asce, profile.cc_requirements.building_code);
//! }
//! ```

pub mod curated;
pub mod error;
pub mod geocode;
pub mod model;
pub mod service;
pub mod wind;

pub use curated::CuratedLocations;
pub use error::{LocationError, Result};
pub use geocode::{Geocoder, GeocoderConfig, HttpGeocoder, PlaceMatch, ZipPlace};
pub use model::{CcRequirements, WindProfile};
pub use service::LocationService;
pub use wind::calculate_wind_speed;
