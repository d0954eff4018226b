//! State Wind Speed Calculator
//!
//! Estimates design wind speed from a state's base speed, a coastal bonus and
//! a terrain factor. Used for locations outside the curated table.

use crate::model::{CcRequirements, WindProfile};

/// Per-state wind data, mph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateWind {
    pub base: u32,
    pub coastal: u32,
    pub special: Option<&'static str>,
}

const fn state(base: u32, coastal: u32, special: Option<&'static str>) -> StateWind {
    StateWind { base, coastal, special }
}

/// Row used for unknown states
pub const DEFAULT_STATE: StateWind = state(95, 5, None);

/// Wind data for a two-letter state code, falling back to [`DEFAULT_STATE`]
pub fn state_wind(code: &str) -> StateWind {
    match code {
        "FL" => state(175, 20, Some("Hurricane region - HVHZ requirements may apply")),
        "LA" => state(150, 15, Some("Hurricane region requirements")),
        "TX" => state(130, 15, Some("Hurricane-prone coastal areas")),
        "SC" => state(140, 10, Some("Coastal wind zone")),
        "NC" => state(135, 10, Some("Hurricane susceptible area")),
        "GA" => state(120, 5, None),
        "AL" => state(125, 10, None),
        "MS" => state(130, 15, Some("Hurricane region")),
        "CA" => state(85, 5, Some("Seismic design typically governs")),
        "NY" => state(115, 10, None),
        "IL" => state(90, 0, None),
        "PA" => state(100, 0, None),
        "OH" | "MO" | "IA" | "MN" | "WV" => state(95, 0, None),
        "MI" | "WI" => state(95, 5, None),
        "WA" | "OR" => state(85, 5, None),
        "NV" => state(85, 0, None),
        "AZ" => state(90, 0, Some("Desert wind considerations")),
        "CO" => state(90, 0, Some("High altitude effects")),
        "UT" | "NM" | "IN" | "KY" | "TN" => state(90, 0, None),
        "WY" => state(95, 0, Some("Mountain wind effects")),
        "MT" => state(90, 0, Some("Terrain considerations")),
        "ND" | "SD" | "NE" | "AR" | "VT" => state(100, 0, None),
        "KS" => state(105, 0, Some("High wind region")),
        "OK" => state(110, 0, Some("Tornado considerations")),
        "VA" => state(105, 10, None),
        "MD" | "CT" | "MA" => state(110, 10, None),
        "DE" | "NJ" => state(115, 10, None),
        "RI" => state(115, 15, Some("Coastal exposure")),
        "NH" => state(105, 5, None),
        "ME" => state(110, 10, Some("Coastal exposure")),
        "AK" => state(85, 10, Some("Arctic conditions")),
        "HI" => state(105, 15, Some("Hurricane region")),
        _ => DEFAULT_STATE,
    }
}

/// Lat/lng rectangle, bounds inclusive
#[derive(Clone, Copy, Debug)]
struct Bounds {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl Bounds {
    const fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self { min_lat, max_lat, min_lng, max_lng }
    }

    fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

const COASTAL_REGIONS: [Bounds; 4] = [
    Bounds::new(24.0, 45.0, -85.0, -75.0),   // Atlantic
    Bounds::new(24.0, 31.0, -98.0, -80.0),   // Gulf
    Bounds::new(32.0, 49.0, -125.0, -115.0), // Pacific
    Bounds::new(41.0, 49.0, -93.0, -75.0),   // Great Lakes
];

const ELEVATED_REGIONS: [Bounds; 2] = [
    Bounds::new(37.0, 49.0, -115.0, -102.0), // Rockies
    Bounds::new(35.0, 45.0, -85.0, -75.0),   // Appalachians
];

const ELEVATION_FACTOR: f64 = 1.1;

pub fn is_coastal(lat: f64, lng: f64) -> bool {
    COASTAL_REGIONS.iter().any(|b| b.contains(lat, lng))
}

pub fn elevation_factor(lat: f64, lng: f64) -> f64 {
    if ELEVATED_REGIONS.iter().any(|b| b.contains(lat, lng)) {
        ELEVATION_FACTOR
    } else {
        1.0
    }
}

/// C&C requirements by state
pub fn cc_requirements(state: &str) -> CcRequirements {
    let (allows_nominal, nominal_factor, shutters, impact, code, notes) = match state {
        "FL" => (
            true,
            Some(0.6),
            true,
            true,
            "Florida Building Code",
            "HVHZ requirements may apply. Impact-resistant openings required.",
        ),
        "TX" => (
            true,
            Some(0.6),
            false,
            false,
            "Texas Building Code",
            "Hurricane considerations for coastal areas.",
        ),
        "CA" => (
            false,
            None,
            false,
            false,
            "California Building Code",
            "Seismic design typically governs over wind.",
        ),
        "NY" => (
            false,
            None,
            false,
            false,
            "New York State Building Code",
            "Ultimate wind pressures required for all applications.",
        ),
        _ => (
            false,
            None,
            false,
            false,
            "International Building Code",
            "Standard IBC wind load provisions apply.",
        ),
    };

    CcRequirements {
        allows_nominal,
        storm_shutters_required: shutters,
        impact_resistance_required: impact,
        building_code: code.into(),
        nominal_factor,
        special_notes: notes.into(),
    }
}

/// Wind profile for a point in `state` near `city`
pub fn calculate_wind_speed(lat: f64, lng: f64, state: &str, city: &str) -> WindProfile {
    let data = state_wind(state);
    let coastal_bonus = if is_coastal(lat, lng) { data.coastal } else { 0 };
    let speed = (f64::from(data.base + coastal_bonus) * elevation_factor(lat, lng)).round();

    // Bounded by the table maximum times the elevation factor.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let asce = speed as u32;

    WindProfile {
        asce,
        local: asce,
        jurisdiction: format!("{city}, {state}"),
        special_requirement: data.special.map(Into::into),
        lat,
        lng,
        cc_requirements: cc_requirements(state),
    }
}
