//! Wind Profile Types

use serde::{Deserialize, Serialize};

/// Components & cladding design requirements for a jurisdiction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcRequirements {
    /// Whether nominal (ASD) pressures are accepted
    pub allows_nominal: bool,
    pub storm_shutters_required: bool,
    pub impact_resistance_required: bool,
    pub building_code: String,
    /// Ultimate-to-nominal conversion factor where nominal is allowed
    #[serde(default)]
    pub nominal_factor: Option<f64>,
    pub special_notes: String,
}

/// Design wind speeds and code requirements for one location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindProfile {
    /// ASCE 7 ultimate design wind speed, mph
    pub asce: u32,
    /// Local jurisdiction wind speed, mph
    pub local: u32,
    pub jurisdiction: String,
    #[serde(default)]
    pub special_requirement: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub cc_requirements: CcRequirements,
}

impl WindProfile {
    /// Local authority requires more than ASCE 7
    pub const fn has_local_override(&self) -> bool {
        self.local > self.asce
    }

    /// Speed to design for
    pub fn governing_speed(&self) -> u32 {
        self.asce.max(self.local)
    }
}
