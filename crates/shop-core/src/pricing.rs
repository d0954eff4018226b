//! Cart Pricing
//!
//! Turns a list of selections into a price breakdown:
//!
//! ```text
//! selection ──resolve──▶ product ──normalize──▶ monthly price + annual total
//!                                                   │
//!          subtotal = Σ monthly  ◀──────────────────┘
//!          bundle   = platform + calculator present → 15% off
//!          charge   = all annual ? Σ annual (× 0.85 if bundle) per year
//!                                : discounted monthly total per month
//! ```
//!
//! Amounts keep full precision until presentation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ProductCategory};
use crate::model::{BillingCycle, Selection};

/// Discount for buying a platform plan together with a calculator
pub const BUNDLE_DISCOUNT_PERCENT: Decimal = dec!(15);

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Pricing knobs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Bundle discount, in percent
    pub bundle_discount_percent: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            bundle_discount_percent: BUNDLE_DISCOUNT_PERCENT,
        }
    }
}

/// How often the aggregated charge recurs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargePeriod {
    Month,
    Year,
}

impl ChargePeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for ChargePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priced cart line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_code: String,

    /// Short display name
    pub name: String,

    pub category: ProductCategory,
    pub billing_cycle: BillingCycle,

    /// Annual price / 12 for annual items, monthly price otherwise
    pub normalized_monthly_price: Decimal,

    /// Annual price for annual items, monthly price × 12 otherwise
    pub annual_total: Decimal,

    pub features: Vec<String>,
}

/// Full price breakdown of a cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub items: Vec<LineItem>,

    /// Sum of normalized monthly prices
    pub subtotal: Decimal,

    /// Monthly-terms bundle discount (zero when not eligible)
    pub bundle_discount: Decimal,

    /// Zero or the configured percentage
    pub bundle_discount_percent: Decimal,

    /// Subtotal minus bundle discount
    pub total: Decimal,

    /// Amount billed at once
    pub charge_total: Decimal,
    pub charge_period: ChargePeriod,

    pub all_annual: bool,
    pub all_monthly: bool,

    /// Number of selections held, including ones no longer in the catalog
    pub item_count: usize,

    pub has_bundle_discount: bool,
}

impl Breakdown {
    /// e.g. "$969.00/year"
    pub fn charge_label(&self) -> String {
        format!("{}/{}", format_usd(self.charge_total), self.charge_period)
    }

    /// One-line summary for logs and notifications
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} item{} - {}",
            self.item_count,
            if self.item_count == 1 { "" } else { "s" },
            self.charge_label()
        );
        if self.has_bundle_discount {
            line.push_str(&format!(" (bundle -{}%)", self.bundle_discount_percent.normalize()));
        }
        line
    }
}

/// Compute the breakdown for `selections`
///
/// Selections whose product code is no longer in the catalog contribute
/// nothing.
pub fn compute_breakdown(
    selections: &[Selection],
    catalog: &Catalog,
    config: &PricingConfig,
) -> Breakdown {
    let mut items = Vec::with_capacity(selections.len());
    let mut subtotal = Decimal::ZERO;
    let mut annual_sum = Decimal::ZERO;
    let mut has_platform = false;
    let mut has_calculator = false;

    for selection in selections {
        let Some(product) = catalog.get(&selection.product_code) else {
            tracing::debug!(product_code = %selection.product_code, "Skipping unknown product");
            continue;
        };

        let (normalized_monthly_price, annual_total) = match selection.billing_cycle {
            BillingCycle::Annual => (product.annual_price / MONTHS_PER_YEAR, product.annual_price),
            BillingCycle::Monthly => (product.monthly_price, product.monthly_price * MONTHS_PER_YEAR),
        };

        subtotal += normalized_monthly_price;
        annual_sum += annual_total;

        match product.category {
            ProductCategory::Platform => has_platform = true,
            ProductCategory::Calculator => has_calculator = true,
            ProductCategory::Package => {}
        }

        items.push(LineItem {
            product_code: product.code.clone(),
            name: product.short_name.clone(),
            category: product.category,
            billing_cycle: selection.billing_cycle,
            normalized_monthly_price,
            annual_total,
            features: product.features.clone(),
        });
    }

    let has_bundle_discount = has_platform && has_calculator;
    let percent = if has_bundle_discount {
        config.bundle_discount_percent
    } else {
        Decimal::ZERO
    };

    let bundle_discount = subtotal * percent / dec!(100);
    let total = subtotal - bundle_discount;

    let all_annual = !selections.is_empty() && selections.iter().all(Selection::is_annual);
    let all_monthly = !selections.is_empty() && selections.iter().all(|s| !s.is_annual());

    // Annual charges take the discount off the yearly sum directly rather
    // than scaling the monthly-terms discount.
    let (charge_total, charge_period) = if all_annual {
        (annual_sum * (Decimal::ONE - percent / dec!(100)), ChargePeriod::Year)
    } else {
        (total, ChargePeriod::Month)
    };

    Breakdown {
        items,
        subtotal,
        bundle_discount,
        bundle_discount_percent: percent,
        total,
        charge_total,
        charge_period,
        all_annual,
        all_monthly,
        item_count: selections.len(),
        has_bundle_discount,
    }
}

/// Round to cents for display
pub fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// e.g. "$1,234.50"
pub fn format_usd(amount: Decimal) -> String {
    let rounded = to_cents(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Product::new("platform", "Platform", "Platform", ProductCategory::Platform, dec!(79), dec!(804)),
            Product::new("calculator", "Calculator", "Calc", ProductCategory::Calculator, dec!(35), dec!(336)),
            Product::new("calculator_2", "Calculator 2", "Calc 2", ProductCategory::Calculator, dec!(59), dec!(564)),
            Product::new("package", "Package", "Pkg", ProductCategory::Package, dec!(99), dec!(999)),
        ])
        .unwrap()
    }

    fn select(code: &str, cycle: BillingCycle) -> Selection {
        Selection::new(code, cycle)
    }

    #[test]
    fn test_empty_breakdown() {
        let b = compute_breakdown(&[], &catalog(), &PricingConfig::default());
        assert_eq!(b.item_count, 0);
        assert_eq!(b.subtotal, Decimal::ZERO);
        assert!(!b.has_bundle_discount);
        assert!(!b.all_annual);
        assert!(!b.all_monthly);
        assert_eq!(b.charge_period, ChargePeriod::Month);
        assert_eq!(b.charge_total, Decimal::ZERO);
    }

    #[test]
    fn test_annual_bundle() {
        let selections = [
            select("platform", BillingCycle::Annual),
            select("calculator", BillingCycle::Annual),
        ];
        let b = compute_breakdown(&selections, &catalog(), &PricingConfig::default());

        assert_eq!(b.subtotal, dec!(95));
        assert!(b.has_bundle_discount);
        assert_eq!(b.bundle_discount_percent, dec!(15));
        assert_eq!(b.bundle_discount, dec!(14.25));
        assert_eq!(b.total, dec!(80.75));
        assert!(b.all_annual);
        assert_eq!(b.charge_period, ChargePeriod::Year);
        assert_eq!(b.charge_total, dec!(969));
        assert_eq!(b.charge_label(), "$969.00/year");
    }

    #[test]
    fn test_mixed_cycles_charge_monthly_total() {
        let selections = [
            select("platform", BillingCycle::Monthly),
            select("calculator", BillingCycle::Annual),
        ];
        let b = compute_breakdown(&selections, &catalog(), &PricingConfig::default());

        assert!(!b.all_annual);
        assert!(!b.all_monthly);
        assert_eq!(b.subtotal, dec!(107));
        assert_eq!(b.charge_period, ChargePeriod::Month);
        assert_eq!(b.charge_total, b.total);
        assert_eq!(to_cents(b.total), dec!(90.95));
    }

    #[test]
    fn test_all_monthly_line_items() {
        let selections = [select("calculator", BillingCycle::Monthly)];
        let b = compute_breakdown(&selections, &catalog(), &PricingConfig::default());

        assert!(b.all_monthly);
        assert_eq!(b.items[0].normalized_monthly_price, dec!(35));
        assert_eq!(b.items[0].annual_total, dec!(420));
        assert_eq!(b.charge_total, dec!(35));
    }

    #[test]
    fn test_calculators_alone_never_bundle() {
        let selections = [
            select("calculator", BillingCycle::Annual),
            select("calculator_2", BillingCycle::Annual),
        ];
        let b = compute_breakdown(&selections, &catalog(), &PricingConfig::default());
        assert!(!b.has_bundle_discount);
        assert_eq!(b.bundle_discount, Decimal::ZERO);
        assert_eq!(b.bundle_discount_percent, Decimal::ZERO);
        assert_eq!(b.charge_total, dec!(900));
    }

    #[test]
    fn test_package_does_not_complete_bundle() {
        let selections = [
            select("platform", BillingCycle::Monthly),
            select("package", BillingCycle::Monthly),
        ];
        let b = compute_breakdown(&selections, &catalog(), &PricingConfig::default());
        assert!(!b.has_bundle_discount);
    }

    #[test]
    fn test_unknown_codes_are_skipped_but_counted() {
        let selections = [
            select("retired_product", BillingCycle::Annual),
            select("calculator", BillingCycle::Annual),
        ];
        let b = compute_breakdown(&selections, &catalog(), &PricingConfig::default());
        assert_eq!(b.items.len(), 1);
        assert_eq!(b.item_count, 2);
        assert_eq!(b.subtotal, dec!(28));
    }

    #[test]
    fn test_full_precision_until_presentation() {
        let catalog = Catalog::new(vec![Product::new(
            "odd",
            "Odd",
            "Odd",
            ProductCategory::Calculator,
            dec!(10),
            dec!(100),
        )])
        .unwrap();
        let selections = [select("odd", BillingCycle::Annual)];
        let b = compute_breakdown(&selections, &catalog, &PricingConfig::default());

        assert_ne!(b.subtotal, dec!(8.33));
        assert_eq!(to_cents(b.subtotal), dec!(8.33));
    }

    #[test]
    fn test_custom_discount_percent() {
        let config = PricingConfig {
            bundle_discount_percent: dec!(20),
        };
        let selections = [
            select("platform", BillingCycle::Annual),
            select("calculator", BillingCycle::Annual),
        ];
        let b = compute_breakdown(&selections, &catalog(), &config);
        assert_eq!(b.bundle_discount, dec!(19));
        assert_eq!(b.charge_total, dec!(912));
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(dec!(0)), "$0.00");
        assert_eq!(format_usd(dec!(80.745)), "$80.75");
        assert_eq!(format_usd(dec!(1524)), "$1,524.00");
        assert_eq!(format_usd(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(dec!(-14.25)), "-$14.25");
    }
}
