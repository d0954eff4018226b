//! Bundle Upsell Offers
//!
//! Cross-sell banners shown on a shop page: calculator buyers are offered the
//! platform, platform buyers are offered calculators, both at the bundle
//! discount for a limited window.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ProductCategory};
use crate::error::Result;
use crate::pricing::{to_cents, PricingConfig};
use crate::storage::CartStorage;

/// Storage slot remembering when the offer was first shown
pub const OFFER_START_KEY: &str = "bundle_offer_start";

/// Length of the limited-time offer
pub const OFFER_WINDOW_DAYS: i64 = 30;

/// Which shop page the visitor is on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopPage {
    Calculator,
    Platform,
}

impl ShopPage {
    /// Category promoted on this page
    pub const fn complementary(self) -> ProductCategory {
        match self {
            Self::Calculator => ProductCategory::Platform,
            Self::Platform => ProductCategory::Calculator,
        }
    }
}

/// Price after the bundle discount, rounded to cents
pub fn bundle_price(base: Decimal, percent: Decimal) -> Decimal {
    to_cents(base - base * percent / dec!(100))
}

/// Days left in the offer window, starting the window on first call
///
/// A missing or unreadable start marker is (re)set to `now`.
pub fn offer_days_remaining<S: CartStorage + ?Sized>(storage: &S, now: DateTime<Utc>) -> Result<u32> {
    let start = storage
        .get(OFFER_START_KEY)?
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis);

    let start = match start {
        Some(start) => start,
        None => {
            storage.set(OFFER_START_KEY, &now.timestamp_millis().to_string())?;
            now
        }
    };

    let days_passed = (now - start).num_days().max(0);
    let remaining = (OFFER_WINDOW_DAYS - days_passed).max(0);
    Ok(u32::try_from(remaining).unwrap_or(0))
}

/// One promoted product
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferLine {
    pub product_code: String,
    pub name: String,
    pub base_monthly_price: Decimal,
    pub bundle_monthly_price: Decimal,
    pub monthly_savings: Decimal,
    /// False for coming-soon products shown as teasers
    pub available: bool,
}

/// Content of an upsell banner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellBanner {
    pub page: ShopPage,
    pub headline: String,
    pub discount_percent: Decimal,
    pub days_remaining: u32,
    pub offers: Vec<OfferLine>,
}

impl UpsellBanner {
    /// Build the banner for `page`
    pub fn for_page(
        page: ShopPage,
        catalog: &Catalog,
        pricing: &PricingConfig,
        days_remaining: u32,
    ) -> Self {
        let percent = pricing.bundle_discount_percent;

        let offers = catalog
            .by_category(page.complementary())
            .into_iter()
            .map(|product| {
                let bundle = bundle_price(product.monthly_price, percent);
                OfferLine {
                    product_code: product.code.clone(),
                    name: product.short_name.clone(),
                    base_monthly_price: product.monthly_price,
                    bundle_monthly_price: bundle,
                    monthly_savings: product.monthly_price - bundle,
                    available: product.available,
                }
            })
            .collect();

        let headline = match page {
            ShopPage::Calculator => {
                format!("Add the Building Intelligence Platform - Save {}%!", percent.normalize())
            }
            ShopPage::Platform => {
                format!("Complete Your Toolkit - Save {}%!", percent.normalize())
            }
        };

        Self {
            page,
            headline,
            discount_percent: percent,
            days_remaining,
            offers,
        }
    }

    /// Offers that can be added right now
    pub fn purchasable(&self) -> impl Iterator<Item = &OfferLine> {
        self.offers.iter().filter(|o| o.available)
    }

    pub const fn is_expired(&self) -> bool {
        self.days_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::Duration;

    #[test]
    fn test_bundle_price() {
        assert_eq!(bundle_price(dec!(79), dec!(15)), dec!(67.15));
        assert_eq!(bundle_price(dec!(35), dec!(15)), dec!(29.75));
    }

    #[test]
    fn test_offer_window_starts_on_first_view() {
        let storage = MemoryStorage::new();
        let now = Utc::now();

        assert_eq!(offer_days_remaining(&storage, now).unwrap(), 30);
        assert!(storage.get(OFFER_START_KEY).unwrap().is_some());

        let later = now + Duration::days(7) + Duration::hours(3);
        assert_eq!(offer_days_remaining(&storage, later).unwrap(), 23);

        let much_later = now + Duration::days(45);
        assert_eq!(offer_days_remaining(&storage, much_later).unwrap(), 0);
    }

    #[test]
    fn test_garbage_offer_start_is_reset() {
        let storage = MemoryStorage::with_value(OFFER_START_KEY, "not-a-number");
        let now = Utc::now();
        assert_eq!(offer_days_remaining(&storage, now).unwrap(), 30);
        assert_eq!(
            storage.get(OFFER_START_KEY).unwrap(),
            Some(now.timestamp_millis().to_string())
        );
    }

    #[test]
    fn test_calculator_page_promotes_platform() {
        let banner = UpsellBanner::for_page(
            ShopPage::Calculator,
            &Catalog::reference(),
            &PricingConfig::default(),
            12,
        );

        assert_eq!(banner.offers.len(), 3);
        let pro = banner.offers.iter().find(|o| o.product_code == "bip_pro").unwrap();
        assert_eq!(pro.bundle_monthly_price, dec!(67.15));
        assert_eq!(pro.monthly_savings, dec!(11.85));
        assert!(banner.headline.contains("15%"));
    }

    #[test]
    fn test_platform_page_flags_coming_soon_calculators() {
        let banner = UpsellBanner::for_page(
            ShopPage::Platform,
            &Catalog::reference(),
            &PricingConfig::default(),
            0,
        );

        assert_eq!(banner.offers.len(), 6);
        assert_eq!(banner.purchasable().count(), 3);
        assert!(banner.is_expired());
    }
}
