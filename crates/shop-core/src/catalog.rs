//! Product Catalog
//!
//! Static, read-only reference data. The cart never owns products, it only
//! points at them by code.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CartError, Result};

/// Product families sold in the storefront
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    /// Building Intelligence Platform tiers
    Platform,
    /// Wind load calculators
    Calculator,
    /// Multi-calculator packages
    Package,
}

impl ProductCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Calculator => "calculator",
            Self::Package => "package",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A subscription product
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product code (e.g., "bip_pro")
    pub code: String,

    /// Full name (e.g., "Building Intelligence Platform - Pro")
    pub name: String,

    /// Name shown in the cart
    pub short_name: String,

    pub category: ProductCategory,

    /// Price per month when billed monthly
    pub monthly_price: Decimal,

    /// Price per year when billed annually, set independently of the monthly price
    pub annual_price: Decimal,

    /// False for "coming soon" products
    #[serde(default = "default_available")]
    pub available: bool,

    #[serde(default)]
    pub features: Vec<String>,
}

const fn default_available() -> bool {
    true
}

impl Product {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        short_name: impl Into<String>,
        category: ProductCategory,
        monthly_price: Decimal,
        annual_price: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            short_name: short_name.into(),
            category,
            monthly_price,
            annual_price,
            available: true,
            features: Vec::new(),
        }
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Mark as listed but not yet purchasable
    pub const fn coming_soon(mut self) -> Self {
        self.available = false;
        self
    }
}

/// Largest list price a catalog accepts, in dollars
pub const MAX_PRICE: Decimal = dec!(1000000);

/// Read-only mapping from product code to product
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: HashMap<String, Product>,
    /// Listing order, as configured
    order: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate codes and prices outside
    /// `0..=MAX_PRICE`
    pub fn new(products: Vec<Product>) -> Result<Self> {
        let mut catalog = Self::default();

        for product in products {
            if product.monthly_price.is_sign_negative() || product.annual_price.is_sign_negative() {
                return Err(CartError::Catalog(format!(
                    "negative price for {}",
                    product.code
                )));
            }
            if product.monthly_price > MAX_PRICE || product.annual_price > MAX_PRICE {
                return Err(CartError::Catalog(format!(
                    "price above {MAX_PRICE} for {}",
                    product.code
                )));
            }
            if catalog.products.contains_key(&product.code) {
                return Err(CartError::Catalog(format!(
                    "duplicate product code {}",
                    product.code
                )));
            }
            catalog.order.push(product.code.clone());
            catalog.products.insert(product.code.clone(), product);
        }

        Ok(catalog)
    }

    /// Parse a catalog from a JSON array of products
    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// The storefront's built-in catalog
    pub fn reference() -> Self {
        let products = vec![
            // Building Intelligence Platform
            Product::new(
                "bip_starter",
                "Building Intelligence Platform - Starter",
                "BIP Starter",
                ProductCategory::Platform,
                dec!(29),
                dec!(300),
            )
            .with_features(["1 user", "50 calculations/month", "All 5 features", "Email support"]),
            Product::new(
                "bip_pro",
                "Building Intelligence Platform - Pro",
                "BIP Pro",
                ProductCategory::Platform,
                dec!(79),
                dec!(804),
            )
            .with_features(["5 users", "250 calculations/month", "Priority support", "Team features"]),
            Product::new(
                "bip_premium",
                "Building Intelligence Platform - Premium",
                "BIP Premium",
                ProductCategory::Platform,
                dec!(149),
                dec!(1524),
            )
            .with_features([
                "15 users",
                "Unlimited calculations",
                "Hurricane Intelligence AI",
                "API access",
            ]),
            // Wind Load Calculators
            Product::new(
                "cc_walls_starter",
                "Windows, Doors & Shutters Calculator - Starter",
                "Calculator Starter",
                ProductCategory::Calculator,
                dec!(35),
                dec!(336),
            )
            .with_features(["1 user", "100 calculations/month", "PDF exports", "Email support"]),
            Product::new(
                "cc_walls_pro",
                "Windows, Doors & Shutters Calculator - Pro",
                "Calculator Pro",
                ProductCategory::Calculator,
                dec!(59),
                dec!(564),
            )
            .with_features(["5 users", "500 calculations/month", "Priority support", "Team features"]),
            Product::new(
                "cc_walls_premium",
                "Windows, Doors & Shutters Calculator - Premium",
                "Calculator Premium",
                ProductCategory::Calculator,
                dec!(149),
                dec!(1428),
            )
            .with_features(["10 users", "Unlimited calculations", "Priority support", "API access"]),
            // Coming soon
            Product::new(
                "cc_roofs_starter",
                "Roofing Systems Calculator - Starter",
                "Roofing Starter",
                ProductCategory::Calculator,
                dec!(35),
                dec!(336),
            )
            .coming_soon(),
            Product::new(
                "cc_solar_starter",
                "Solar Panels Calculator - Starter",
                "Solar Starter",
                ProductCategory::Calculator,
                dec!(35),
                dec!(336),
            )
            .coming_soon(),
            Product::new(
                "mwfrs_starter",
                "MWFRS Calculator - Starter",
                "MWFRS Starter",
                ProductCategory::Calculator,
                dec!(49),
                dec!(470),
            )
            .coming_soon(),
        ];

        Self::new(products).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Built-in catalog rejected");
            Self::default()
        })
    }

    /// Look up any product, purchasable or not
    pub fn get(&self, code: &str) -> Option<&Product> {
        self.products.get(code)
    }

    /// Look up a product only if it can be added to a cart
    pub fn available(&self, code: &str) -> Option<&Product> {
        self.get(code).filter(|p| p.available)
    }

    /// Products of one category, in listing order
    pub fn by_category(&self, category: ProductCategory) -> Vec<&Product> {
        self.iter().filter(|p| p.category == category).collect()
    }

    /// All products, in listing order
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|code| self.products.get(code))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_catalog() {
        let catalog = Catalog::reference();
        assert_eq!(catalog.len(), 9);

        let bip = catalog.get("bip_pro").unwrap();
        assert_eq!(bip.category, ProductCategory::Platform);
        assert_eq!(bip.monthly_price, dec!(79));
        assert_eq!(bip.annual_price, dec!(804));

        assert!(catalog.get("cc_roofs_starter").is_some());
        assert!(catalog.available("cc_roofs_starter").is_none());
        assert!(catalog.available("cc_walls_starter").is_some());
    }

    #[test]
    fn test_by_category_keeps_listing_order() {
        let catalog = Catalog::reference();
        let codes: Vec<&str> = catalog
            .by_category(ProductCategory::Platform)
            .iter()
            .map(|p| p.code.as_str())
            .collect();
        assert_eq!(codes, ["bip_starter", "bip_pro", "bip_premium"]);
    }

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(
            r#"[
                {"code": "p", "name": "Platform", "shortName": "P", "category": "platform",
                 "monthlyPrice": 79, "annualPrice": "804"},
                {"code": "c", "name": "Calculator", "shortName": "C", "category": "calculator",
                 "monthlyPrice": 35, "annualPrice": 336, "available": false}
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.get("p").unwrap().annual_price, dec!(804));
        assert!(catalog.get("p").unwrap().available);
        assert!(!catalog.get("c").unwrap().available);
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let product = Product::new("x", "X", "X", ProductCategory::Calculator, dec!(1), dec!(10));
        let result = Catalog::new(vec![product.clone(), product]);
        assert!(matches!(result, Err(CartError::Catalog(_))));
    }

    #[test]
    fn test_reference_catalog_passes_validation() {
        let products: Vec<Product> = Catalog::reference().iter().cloned().collect();
        let rebuilt = Catalog::new(products).unwrap();
        assert_eq!(rebuilt.len(), 9);
    }

    #[test]
    fn test_out_of_range_prices_rejected() {
        let result = Catalog::from_json(
            r#"[{"code": "big", "name": "Big", "shortName": "B", "category": "calculator",
                 "monthlyPrice": "79228162514264337593543950335", "annualPrice": "1"}]"#,
        );
        assert!(matches!(result, Err(CartError::Catalog(_))));

        let negative = Product::new("n", "N", "N", ProductCategory::Calculator, dec!(-1), dec!(10));
        assert!(Catalog::new(vec![negative]).is_err());

        let at_limit = Product::new("l", "L", "L", ProductCategory::Platform, MAX_PRICE, MAX_PRICE);
        assert!(Catalog::new(vec![at_limit]).is_ok());
    }
}
