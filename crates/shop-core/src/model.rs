//! Domain Models
//!
//! Cart selections and the billing vocabulary shared by pricing and checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment frequency chosen per cart item
///
/// Annual is preselected in the storefront.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    #[default]
    Annual,
}

impl BillingCycle {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    pub const fn is_annual(self) -> bool {
        matches!(self, Self::Annual)
    }

    /// Parse a cycle name, `None` for anything else
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Some(Self::Monthly),
            "annual" | "annually" | "yearly" | "year" => Some(Self::Annual),
            _ => None,
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// An entry in the cart
///
/// Serialized in the shape the storefront has always persisted:
/// `{"productCode": "...", "billingCycle": "annual", "addedAt": 1717171717171}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Catalog product code
    pub product_code: String,

    /// Chosen billing cycle
    pub billing_cycle: BillingCycle,

    /// When the item was put in the cart (millisecond precision)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub added_at: DateTime<Utc>,
}

impl Selection {
    pub fn new(product_code: impl Into<String>, billing_cycle: BillingCycle) -> Self {
        Self {
            product_code: product_code.into(),
            billing_cycle,
            added_at: now_millis(),
        }
    }

    pub const fn is_annual(&self) -> bool {
        self.billing_cycle.is_annual()
    }
}

/// Current time truncated to what the persisted form can hold
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
