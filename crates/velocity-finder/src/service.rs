//! Location Lookup Service
//!
//! Resolution order for an input string:
//!
//! 1. results cached earlier in this session
//! 2. curated ZIP table
//! 3. US ZIP code → geocoder → state wind calculator
//! 4. free text → geocoder search → calculator with the default state row

use std::collections::HashMap;

use regex::Regex;
use tokio::sync::RwLock;

use crate::curated::CuratedLocations;
use crate::error::{LocationError, Result};
use crate::geocode::Geocoder;
use crate::model::WindProfile;
use crate::wind::calculate_wind_speed;

const ZIP_PATTERN: &str = r"^\d{5}(-\d{4})?$";
const DEFAULT_STATE_CODE: &str = "DEFAULT";
const UNKNOWN_CITY: &str = "Unknown Location";

pub struct LocationService<G: Geocoder> {
    geocoder: G,
    curated: CuratedLocations,
    zip_pattern: Regex,
    cache: RwLock<HashMap<String, WindProfile>>,
}

impl<G: Geocoder> LocationService<G> {
    /// Service backed by the bundled curated table
    pub fn new(geocoder: G) -> Result<Self> {
        Self::with_curated(geocoder, CuratedLocations::bundled()?)
    }

    pub fn with_curated(geocoder: G, curated: CuratedLocations) -> Result<Self> {
        let zip_pattern = Regex::new(ZIP_PATTERN).map_err(|e| LocationError::Data(e.to_string()))?;
        Ok(Self {
            geocoder,
            curated,
            zip_pattern,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub const fn curated(&self) -> &CuratedLocations {
        &self.curated
    }

    pub fn is_zip(&self, input: &str) -> bool {
        self.zip_pattern.is_match(input)
    }

    /// Wind profile for a ZIP code or place name
    ///
    /// Returns `None` when nothing could be found; the reason is logged.
    pub async fn lookup(&self, input: &str) -> Option<WindProfile> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(hit) = self.cache.read().await.get(input) {
            return Some(hit.clone());
        }

        match self.resolve(input).await {
            Ok(profile) => {
                self.cache.write().await.insert(input.to_string(), profile.clone());
                Some(profile)
            }
            Err(e) => {
                tracing::warn!(input, geocoder = self.geocoder.name(), error = %e, "Location lookup failed");
                None
            }
        }
    }

    async fn resolve(&self, input: &str) -> Result<WindProfile> {
        if let Some(profile) = self.curated.get(input) {
            tracing::debug!(input, "Curated location");
            return Ok(profile.clone());
        }

        if self.is_zip(input) {
            let place = self.geocoder.locate_zip(input).await?;
            tracing::debug!(input, state = %place.state, "Geocoded ZIP");
            return Ok(calculate_wind_speed(place.lat, place.lng, &place.state, &place.place_name));
        }

        let best = self
            .geocoder
            .search(input)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::NotFound(input.into()))?;

        tracing::debug!(input, place = %best.display_name, "Geocoded place");
        let mut profile = calculate_wind_speed(best.lat, best.lng, DEFAULT_STATE_CODE, UNKNOWN_CITY);
        profile.jurisdiction = best.display_name;
        Ok(profile)
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}
