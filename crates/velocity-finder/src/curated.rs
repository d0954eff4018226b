//! Curated Locations
//!
//! Hand-verified wind data for ZIP codes whose local authority publishes
//! its own design speeds. Takes precedence over calculated values.

use std::collections::HashMap;

use crate::error::{LocationError, Result};
use crate::model::WindProfile;

const BUNDLED: &str = include_str!("../data/curated_locations.json");
const DEFAULT_KEY: &str = "default";

/// Table of curated wind profiles keyed by ZIP code
#[derive(Clone, Debug)]
pub struct CuratedLocations {
    entries: HashMap<String, WindProfile>,
    fallback: WindProfile,
}

impl CuratedLocations {
    /// Table shipped with the crate
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    /// Parse a `{ zip: profile }` table; it must carry a `default` entry
    pub fn from_json(json: &str) -> Result<Self> {
        let mut entries: HashMap<String, WindProfile> = serde_json::from_str(json)?;
        let fallback = entries
            .remove(DEFAULT_KEY)
            .ok_or_else(|| LocationError::Data("curated table has no default entry".into()))?;

        tracing::debug!(count = entries.len(), "Loaded curated locations");
        Ok(Self { entries, fallback })
    }

    pub fn get(&self, zip: &str) -> Option<&WindProfile> {
        self.entries.get(zip)
    }

    /// Generic ASCE 7 profile for places nothing else covers
    pub const fn fallback(&self) -> &WindProfile {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn zip_codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
